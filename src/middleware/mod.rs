pub mod auth;
pub mod rejection;
pub mod role;
pub mod self_check;

pub use auth::{require_auth, AuthGate, CredentialSource};
pub use rejection::{DenyReason, GateError, UnauthenticatedReason};
pub use role::{require_admin, RoleGate, RoleLookup};
pub use self_check::SelfCheckGuard;
