use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;

use crate::auth::TokenCodec;
use crate::database::{DocumentStore, DocumentUserDirectory, UserDirectory};
use crate::middleware::{AuthGate, RoleGate, RoleLookup, SelfCheckGuard};

/// Shared, read-only capabilities handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub store: Arc<dyn DocumentStore>,
    pub auth_gate: AuthGate,
    pub role_gate: RoleGate,
    pub self_check: SelfCheckGuard,
}

impl AppState {
    /// Wire the gates against a store, resolving roles from its `users` collection.
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn DocumentStore>, lookup_timeout: Duration) -> Self {
        let directory: Arc<dyn UserDirectory> = Arc::new(DocumentUserDirectory::new(store.clone()));
        Self::with_directory(codec, store, directory, lookup_timeout)
    }

    /// Same as `new` but with an explicit user directory.
    pub fn with_directory(
        codec: Arc<TokenCodec>,
        store: Arc<dyn DocumentStore>,
        directory: Arc<dyn UserDirectory>,
        lookup_timeout: Duration,
    ) -> Self {
        let lookup = RoleLookup::new(directory, lookup_timeout);
        Self {
            auth_gate: AuthGate::new(codec.clone()),
            role_gate: RoleGate::new(lookup.clone()),
            self_check: SelfCheckGuard::new(lookup),
            codec,
            store,
        }
    }
}

impl FromRef<AppState> for AuthGate {
    fn from_ref(state: &AppState) -> Self {
        state.auth_gate.clone()
    }
}

impl FromRef<AppState> for RoleGate {
    fn from_ref(state: &AppState) -> Self {
        state.role_gate.clone()
    }
}

impl FromRef<AppState> for SelfCheckGuard {
    fn from_ref(state: &AppState) -> Self {
        state.self_check.clone()
    }
}

impl FromRef<AppState> for Arc<TokenCodec> {
    fn from_ref(state: &AppState) -> Self {
        state.codec.clone()
    }
}

impl FromRef<AppState> for Arc<dyn DocumentStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}
