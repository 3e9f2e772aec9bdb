use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::auth::TokenCodec;
use crate::error::ApiError;
use crate::handlers::JsonObject;

/// POST /jwt - sign the posted claim set into a bearer token.
///
/// Upstream login is trusted to have established who the caller is; the
/// gateway only issues and verifies the token.
pub async fn issue_token(
    State(codec): State<Arc<TokenCodec>>,
    JsonObject(claims): JsonObject,
) -> Result<Json<Value>, ApiError> {
    let token = codec.sign(&claims)?;

    tracing::info!(
        email = claims.get("email").and_then(|v| v.as_str()).unwrap_or("<none>"),
        ttl_hours = codec.ttl().num_hours(),
        "Issued bearer token"
    );

    Ok(Json(json!({ "token": token })))
}
