use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde_json::Value;

use super::ClaimSet;
use crate::error::ApiError;

/// Verified identity for the request currently being processed.
///
/// Inserted into the request extensions by the auth gate and dropped with the
/// request. Handlers read it through the extractor below; nothing else shares it.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityContext {
    claims: ClaimSet,
}

impl IdentityContext {
    pub fn new(claims: ClaimSet) -> Self {
        Self { claims }
    }

    /// The `email` claim, when present and a string.
    pub fn email(&self) -> Option<&str> {
        self.claims.get("email").and_then(Value::as_str)
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for IdentityContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only reachable when a handler is mounted without the auth gate
        parts.extensions.get::<IdentityContext>().cloned().ok_or_else(|| {
            tracing::error!("Identity requested on {} without a prior auth gate", parts.uri.path());
            ApiError::internal_server_error("Authentication context unavailable")
        })
    }
}
