use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::auth::IdentityContext;
use crate::database::{Collection, DeleteResult, Document, DocumentStore, Filter, Role, UpdateResult};
use crate::error::ApiError;

/// GET /users
pub async fn list_users(State(store): State<Arc<dyn DocumentStore>>) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(store.find(Collection::Users, &Filter::All).await?))
}

/// DELETE /users/:id
pub async fn delete_user(
    State(store): State<Arc<dyn DocumentStore>>,
    identity: IdentityContext,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let result = store.delete_one(Collection::Users, &Filter::id(&id)?).await?;

    tracing::info!(
        by = identity.email().unwrap_or("<none>"),
        user_id = %id,
        deleted = result.deleted_count,
        "Deleted user"
    );
    Ok(Json(result))
}

/// PATCH /users/admin/:user - grant the admin role. `:user` is a document id.
pub async fn promote_user(
    State(store): State<Arc<dyn DocumentStore>>,
    identity: IdentityContext,
    Path(id): Path<String>,
) -> Result<Json<UpdateResult>, ApiError> {
    let mut set = Document::new();
    set.insert("role".to_string(), Value::from(Role::Admin.as_str()));

    let result = store.update_one(Collection::Users, &Filter::id(&id)?, set).await?;

    tracing::info!(
        by = identity.email().unwrap_or("<none>"),
        user_id = %id,
        matched = result.matched_count,
        "Granted admin role"
    );
    Ok(Json(result))
}
