use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::auth::IdentityContext;
use crate::error::ApiError;
use crate::middleware::SelfCheckGuard;

/// GET /users/admin/:user - whether the caller holds the admin role.
///
/// `:user` is an email and must be the caller's own.
pub async fn admin_status(
    State(guard): State<SelfCheckGuard>,
    identity: IdentityContext,
    Path(email): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let admin = guard.is_admin(&identity, &email).await?;
    Ok(Json(json!({ "admin": admin })))
}
