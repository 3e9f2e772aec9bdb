use thiserror::Error;

/// Why a request failed authentication (401).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    MissingCredentials,
    /// Header present but not `Bearer <token>`
    MalformedCredentials,
    InvalidSignature,
    Expired,
    IdentityMismatch,
}

impl UnauthenticatedReason {
    /// Client-facing message. Signature and expiry failures read the same.
    pub fn message(&self) -> &'static str {
        match self {
            UnauthenticatedReason::MissingCredentials => "missing credentials",
            UnauthenticatedReason::MalformedCredentials
            | UnauthenticatedReason::InvalidSignature
            | UnauthenticatedReason::Expired => "invalid or expired credentials",
            UnauthenticatedReason::IdentityMismatch => "identity mismatch",
        }
    }
}

/// Why an authenticated request was denied (403).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoEmailClaim,
    UnknownUser,
    NotAdmin,
    LookupFailed,
    LookupTimedOut,
}

/// Terminal outcome of a failed gate. The request goes no further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("unauthenticated: {0:?}")]
    Unauthenticated(UnauthenticatedReason),

    #[error("forbidden: {0:?}")]
    Forbidden(DenyReason),

    /// A gate that needs an identity ran before the auth gate
    #[error("identity context missing")]
    MissingIdentity,

    /// Role status could not be read for a non-gating query
    #[error("role lookup unavailable")]
    LookupUnavailable,
}
