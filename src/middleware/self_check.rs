use super::rejection::{GateError, UnauthenticatedReason};
use super::role::RoleLookup;
use crate::auth::IdentityContext;

/// Lets an authenticated caller learn whether they themselves are an admin.
///
/// The requested email must equal the token email. There is no 403 branch:
/// a member is told `false`.
#[derive(Clone)]
pub struct SelfCheckGuard {
    lookup: RoleLookup,
}

impl SelfCheckGuard {
    pub fn new(lookup: RoleLookup) -> Self {
        Self { lookup }
    }

    pub async fn is_admin(&self, identity: &IdentityContext, requested_email: &str) -> Result<bool, GateError> {
        let email = match identity.email() {
            Some(email) if email == requested_email => email,
            _ => {
                tracing::warn!(
                    token_email = identity.email().unwrap_or("<none>"),
                    requested_email,
                    "Admin status requested for another identity"
                );
                return Err(GateError::Unauthenticated(UnauthenticatedReason::IdentityMismatch));
            }
        };

        match self.lookup.find(email).await {
            Ok(record) => Ok(record.map(|user| user.is_admin()).unwrap_or(false)),
            Err(_) => Err(GateError::LookupUnavailable),
        }
    }
}
