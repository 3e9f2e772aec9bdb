// Handlers grouped by the guard chain in front of them:
// public (none), protected (auth gate), elevated (auth gate + role gate).
// Routing and guard wiring live in `routes`; handlers never authorize.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde_json::Value;

use crate::database::Document;
use crate::error::ApiError;

pub mod elevated;
pub mod protected;
pub mod public;

/// JSON request body that must be an object.
///
/// Rejections use the API error shape instead of axum's plain-text body.
#[derive(Debug)]
pub struct JsonObject(pub Document);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ApiError::bad_request("Request body must be a JSON object")),
        }
    }
}
