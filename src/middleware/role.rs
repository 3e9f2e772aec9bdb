use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::rejection::{DenyReason, GateError};
use crate::auth::IdentityContext;
use crate::database::{UserDirectory, UserRecord};
use crate::error::ApiError;

/// Bounded, uncached user lookup shared by the role checks.
#[derive(Clone)]
pub struct RoleLookup {
    directory: Arc<dyn UserDirectory>,
    timeout: Duration,
}

impl RoleLookup {
    pub fn new(directory: Arc<dyn UserDirectory>, timeout: Duration) -> Self {
        Self { directory, timeout }
    }

    /// Read the user record for `email`. Every call goes to the store.
    pub async fn find(&self, email: &str) -> Result<Option<UserRecord>, DenyReason> {
        match tokio::time::timeout(self.timeout, self.directory.find_user_by_email(email)).await {
            Ok(Ok(record)) => Ok(record),
            Ok(Err(e)) => {
                tracing::error!(email, "Role lookup failed: {}", e);
                Err(DenyReason::LookupFailed)
            }
            Err(_) => {
                tracing::error!(email, timeout_ms = self.timeout.as_millis() as u64, "Role lookup timed out");
                Err(DenyReason::LookupTimedOut)
            }
        }
    }
}

/// Requires the authenticated identity to hold the admin role in the user store.
///
/// Must run after the auth gate. The lookup key is always the token's email;
/// anything the caller put in the path, query or body is ignored. Any failure
/// to reach a positive answer denies the request.
#[derive(Clone)]
pub struct RoleGate {
    lookup: RoleLookup,
}

impl RoleGate {
    pub fn new(lookup: RoleLookup) -> Self {
        Self { lookup }
    }

    pub async fn evaluate(&self, identity: Option<&IdentityContext>) -> Result<(), GateError> {
        let identity = identity.ok_or(GateError::MissingIdentity)?;
        let email = identity
            .email()
            .ok_or(GateError::Forbidden(DenyReason::NoEmailClaim))?;

        match self.lookup.find(email).await.map_err(GateError::Forbidden)? {
            None => Err(GateError::Forbidden(DenyReason::UnknownUser)),
            Some(user) if !user.is_admin() => Err(GateError::Forbidden(DenyReason::NotAdmin)),
            Some(_) => Ok(()),
        }
    }
}

/// Role gate middleware: forwards only verified admins, otherwise 403.
pub async fn require_admin(
    State(gate): State<RoleGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = request.extensions().get::<IdentityContext>().cloned();

    if let Err(err) = gate.evaluate(identity.as_ref()).await {
        match err {
            GateError::MissingIdentity => tracing::error!(
                path = %request.uri().path(),
                "Role gate mounted without a preceding auth gate"
            ),
            _ => tracing::warn!(
                path = %request.uri().path(),
                email = identity.as_ref().and_then(|i| i.email()).unwrap_or("<none>"),
                "Authorization rejected: {}",
                err
            ),
        }
        return Err(err.into());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::{Role, StoreError};
    use axum::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fake directory that counts lookups and can be made to fail or hang.
    #[derive(Default)]
    pub(crate) struct FakeDirectory {
        pub users: HashMap<String, Role>,
        pub fail: bool,
        pub hang: bool,
        pub lookups: AtomicUsize,
        pub last_key: std::sync::Mutex<Option<String>>,
    }

    impl FakeDirectory {
        pub fn with(users: &[(&str, Role)]) -> Self {
            Self {
                users: users.iter().map(|(e, r)| (e.to_string(), *r)).collect(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl UserDirectory for FakeDirectory {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            *self.last_key.lock().unwrap() = Some(email.to_string());
            if self.hang {
                std::future::pending::<()>().await;
            }
            if self.fail {
                return Err(StoreError::Unavailable("connection reset".into()));
            }
            Ok(self.users.get(email).map(|role| UserRecord {
                id: None,
                email: email.to_string(),
                role: *role,
            }))
        }
    }

    fn identity(email: &str) -> IdentityContext {
        IdentityContext::new(json!({ "email": email }).as_object().unwrap().clone())
    }

    fn gate(directory: Arc<FakeDirectory>) -> RoleGate {
        RoleGate::new(RoleLookup::new(directory, Duration::from_millis(50)))
    }

    #[tokio::test]
    async fn test_admin_passes() {
        let directory = Arc::new(FakeDirectory::with(&[("chef@x.com", Role::Admin)]));
        assert_eq!(gate(directory).evaluate(Some(&identity("chef@x.com"))).await, Ok(()));
    }

    #[tokio::test]
    async fn test_member_and_unknown_denied() {
        let directory = Arc::new(FakeDirectory::with(&[("guest@x.com", Role::Member)]));
        let gate = gate(directory);

        assert_eq!(
            gate.evaluate(Some(&identity("guest@x.com"))).await,
            Err(GateError::Forbidden(DenyReason::NotAdmin))
        );
        assert_eq!(
            gate.evaluate(Some(&identity("ghost@x.com"))).await,
            Err(GateError::Forbidden(DenyReason::UnknownUser))
        );
    }

    #[tokio::test]
    async fn test_fails_closed_on_store_error_and_timeout() {
        let failing = Arc::new(FakeDirectory {
            fail: true,
            ..FakeDirectory::with(&[("chef@x.com", Role::Admin)])
        });
        assert_eq!(
            gate(failing).evaluate(Some(&identity("chef@x.com"))).await,
            Err(GateError::Forbidden(DenyReason::LookupFailed))
        );

        let hanging = Arc::new(FakeDirectory {
            hang: true,
            ..FakeDirectory::with(&[("chef@x.com", Role::Admin)])
        });
        assert_eq!(
            gate(hanging).evaluate(Some(&identity("chef@x.com"))).await,
            Err(GateError::Forbidden(DenyReason::LookupTimedOut))
        );
    }

    #[tokio::test]
    async fn test_missing_identity_or_email() {
        let directory = Arc::new(FakeDirectory::with(&[]));
        let gate = gate(directory.clone());

        assert_eq!(gate.evaluate(None).await, Err(GateError::MissingIdentity));

        let anonymous = IdentityContext::new(json!({ "name": "x" }).as_object().unwrap().clone());
        assert_eq!(
            gate.evaluate(Some(&anonymous)).await,
            Err(GateError::Forbidden(DenyReason::NoEmailClaim))
        );
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_is_not_cached() {
        let directory = Arc::new(FakeDirectory::with(&[("chef@x.com", Role::Admin)]));
        let gate = gate(directory.clone());

        for _ in 0..3 {
            gate.evaluate(Some(&identity("chef@x.com"))).await.unwrap();
        }
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 3);
    }
}
