use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::database::{Collection, DocumentStore, Filter};
use crate::error::ApiError;
use crate::handlers::JsonObject;

/// POST /users - register a user unless the email is already taken.
///
/// Any `role` in the body is dropped: new users are members.
pub async fn register_user(
    State(store): State<Arc<dyn DocumentStore>>,
    JsonObject(mut user): JsonObject,
) -> Result<Json<Value>, ApiError> {
    let email = match user.get("email").and_then(Value::as_str) {
        Some(email) if !email.trim().is_empty() => email.to_string(),
        _ => return Err(ApiError::bad_request("Field 'email' is required")),
    };

    if user.remove("role").is_some() {
        tracing::warn!(email = %email, "Discarded role supplied at registration");
    }

    if store
        .find_one(Collection::Users, &Filter::eq("email", email.as_str()))
        .await?
        .is_some()
    {
        return Ok(Json(json!({ "message": "user already exist", "insertedId": null })));
    }

    let result = store.insert_one(Collection::Users, user).await?;
    tracing::info!(email = %email, "Registered user");
    Ok(Json(json!({
        "acknowledged": result.acknowledged,
        "insertedId": result.inserted_id,
    })))
}
