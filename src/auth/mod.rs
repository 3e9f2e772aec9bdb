use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub mod identity;

pub use identity::IdentityContext;

/// Caller-supplied identity fields embedded in a token (at minimum `email`).
pub type ClaimSet = Map<String, Value>;

/// Registered claims owned by the codec. Callers may not supply them.
pub const RESERVED_CLAIMS: [&str; 2] = ["iat", "exp"];

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 4;

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL_HOURS: i64 = 8760;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Signing secret is not configured")]
    MissingSecret,

    #[error("Claim '{0}' is reserved and cannot be supplied")]
    ReservedClaim(String),

    #[error("Token generation failed: {0}")]
    Signing(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token expired at {expired_at}")]
    Expired { expired_at: i64 },
}

/// Wire form of a token payload: the claim set plus issue/expiry timestamps.
#[derive(Debug, Serialize, Deserialize)]
struct SignedClaims {
    #[serde(flatten)]
    identity: ClaimSet,
    iat: i64,
    exp: i64,
}

/// Signs claim sets into HS256 bearer tokens and verifies them.
///
/// Holds the process signing secret; constructed once at startup and shared
/// read-only between requests.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    fingerprint: String,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in verify_at
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            fingerprint: secret_fingerprint(secret),
        })
    }

    /// Codec with the standard four hour lifetime
    pub fn with_default_ttl(secret: &str) -> Result<Self, TokenError> {
        Self::new(secret, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Short SHA-256 fingerprint of the signing secret, safe to log.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn sign(&self, claims: &ClaimSet) -> Result<String, TokenError> {
        self.sign_at(claims, Utc::now())
    }

    pub fn sign_at(&self, claims: &ClaimSet, now: DateTime<Utc>) -> Result<String, TokenError> {
        if let Some(reserved) = RESERVED_CLAIMS.iter().find(|name| claims.contains_key(**name)) {
            return Err(TokenError::ReservedClaim(reserved.to_string()));
        }

        let payload = SignedClaims {
            identity: claims.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<ClaimSet, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature first, then expiry against `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet, TokenError> {
        let data = decode::<SignedClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!("Token rejected by decoder: {:?}", e.kind());
            TokenError::InvalidSignature
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired {
                expired_at: data.claims.exp,
            });
        }

        Ok(data.claims.identity)
    }
}

fn secret_fingerprint(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    digest[..6].iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> ClaimSet {
        value.as_object().cloned().expect("object claims")
    }

    fn codec() -> TokenCodec {
        TokenCodec::with_default_ttl("test-signing-secret").unwrap()
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let codec = codec();
        let original = claims(json!({
            "email": "guest@bistro.test",
            "name": "Guest",
            "tags": ["a", "b"],
            "nested": { "level": 2 }
        }));

        let token = codec.sign(&original).unwrap();
        assert_eq!(codec.verify(&token).unwrap(), original);
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = codec();
        let issued = Utc::now();
        let token = codec.sign_at(&claims(json!({"email": "a@x.com"})), issued).unwrap();

        let almost = issued + Duration::hours(3) + Duration::minutes(59);
        assert!(codec.verify_at(&token, almost).is_ok());

        let late = issued + Duration::hours(4) + Duration::minutes(1);
        assert!(matches!(
            codec.verify_at(&token, late),
            Err(TokenError::Expired { .. })
        ));
    }

    #[test]
    fn test_expired_exactly_at_exp() {
        let codec = codec();
        let issued = Utc::now();
        let token = codec.sign_at(&claims(json!({"email": "a@x.com"})), issued).unwrap();

        let at_exp = issued + Duration::hours(4);
        assert!(matches!(
            codec.verify_at(&token, at_exp),
            Err(TokenError::Expired { .. })
        ));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = codec();
        let token = codec.sign(&claims(json!({"email": "a@x.com"}))).unwrap();
        let signature_start = token.rfind('.').unwrap() + 1;

        for offset in [signature_start, token.len() - 1] {
            let mut bytes = token.clone().into_bytes();
            bytes[offset] = if bytes[offset] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            assert_eq!(codec.verify(&tampered), Err(TokenError::InvalidSignature));
        }
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let token = codec().sign(&claims(json!({"email": "a@x.com"}))).unwrap();
        let other = TokenCodec::with_default_ttl("another-secret").unwrap();
        assert_eq!(other.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_rejected() {
        let codec = codec();
        assert_eq!(codec.verify(""), Err(TokenError::InvalidSignature));
        assert_eq!(codec.verify("not-a-token"), Err(TokenError::InvalidSignature));
        assert_eq!(codec.verify("a.b.c"), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_reserved_claims_rejected() {
        let codec = codec();
        let err = codec
            .sign(&claims(json!({"email": "a@x.com", "exp": 1})))
            .unwrap_err();
        assert_eq!(err, TokenError::ReservedClaim("exp".to_string()));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            TokenCodec::with_default_ttl(""),
            Err(TokenError::MissingSecret)
        ));
    }

    #[test]
    fn test_fingerprint_is_stable_and_opaque() {
        let a = codec();
        let b = codec();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 12);
        assert!(!a.fingerprint().contains("secret"));
    }
}
