use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::rejection::{GateError, UnauthenticatedReason};
use crate::auth::{IdentityContext, TokenCodec, TokenError};
use crate::error::ApiError;

/// Read access to request headers, independent of the web framework.
pub trait CredentialSource {
    fn header(&self, name: &str) -> Option<&str>;
}

impl CredentialSource for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        // Non-UTF8 values read as empty and fail the bearer parse
        self.get(name).map(|value| value.to_str().unwrap_or(""))
    }
}

/// Requires a valid `Authorization: Bearer <token>` header.
#[derive(Clone, Debug)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
}

impl AuthGate {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Decide the request: an identity to forward with, or a rejection.
    pub fn evaluate(&self, source: &impl CredentialSource) -> Result<IdentityContext, GateError> {
        let header = source
            .header(AUTHORIZATION.as_str())
            .ok_or(GateError::Unauthenticated(UnauthenticatedReason::MissingCredentials))?;

        let token = extract_bearer(header)
            .ok_or(GateError::Unauthenticated(UnauthenticatedReason::MalformedCredentials))?;

        let claims = self.codec.verify(token).map_err(|e| {
            GateError::Unauthenticated(match e {
                TokenError::Expired { .. } => UnauthenticatedReason::Expired,
                _ => UnauthenticatedReason::InvalidSignature,
            })
        })?;

        Ok(IdentityContext::new(claims))
    }
}

/// `Bearer <token>` with a case-insensitive scheme and a non-empty token
fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Auth gate middleware: attaches the identity and forwards exactly once, or rejects with 401.
pub async fn require_auth(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = match gate.evaluate(request.headers()) {
        Ok(identity) => identity,
        Err(err) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                "Authentication rejected: {}",
                err
            );
            return Err(err.into());
        }
    };

    tracing::debug!(email = identity.email().unwrap_or("<none>"), "Authenticated request");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn gate() -> (AuthGate, Arc<TokenCodec>) {
        let codec = Arc::new(TokenCodec::with_default_ttl("gate-secret").unwrap());
        (AuthGate::new(codec.clone()), codec)
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn token_for(codec: &TokenCodec, email: &str) -> String {
        codec.sign(json!({ "email": email }).as_object().unwrap()).unwrap()
    }

    #[test]
    fn test_missing_header() {
        let (gate, _) = gate();
        assert_eq!(
            gate.evaluate(&HeaderMap::new()),
            Err(GateError::Unauthenticated(UnauthenticatedReason::MissingCredentials))
        );
    }

    #[test]
    fn test_malformed_header() {
        let (gate, codec) = gate();
        let token = token_for(&codec, "a@x.com");

        for value in [token.as_str(), "Bearer", "Bearer   ", "Basic dXNlcjpwYXNz"] {
            assert_eq!(
                gate.evaluate(&headers(value)),
                Err(GateError::Unauthenticated(UnauthenticatedReason::MalformedCredentials)),
                "header {:?}",
                value
            );
        }
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let (gate, codec) = gate();
        let token = token_for(&codec, "a@x.com");

        let identity = gate.evaluate(&headers(&format!("Bearer {}", token))).unwrap();
        assert_eq!(identity.email(), Some("a@x.com"));

        let lower = gate.evaluate(&headers(&format!("bearer {}", token))).unwrap();
        assert_eq!(lower, identity);
    }

    #[test]
    fn test_bad_and_expired_tokens() {
        let (gate, codec) = gate();

        assert_eq!(
            gate.evaluate(&headers("Bearer not.a.token")),
            Err(GateError::Unauthenticated(UnauthenticatedReason::InvalidSignature))
        );

        let stale = codec
            .sign_at(json!({ "email": "a@x.com" }).as_object().unwrap(), Utc::now() - Duration::hours(5))
            .unwrap();
        assert_eq!(
            gate.evaluate(&headers(&format!("Bearer {}", stale))),
            Err(GateError::Unauthenticated(UnauthenticatedReason::Expired))
        );
    }
}
