// Handlers behind the auth gate only. They may read the request's
// IdentityContext but never widen access beyond it.

pub mod admin_status;

pub use admin_status::admin_status;
