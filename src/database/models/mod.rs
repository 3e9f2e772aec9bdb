pub mod menu;
pub mod user;

pub use menu::MenuItemPatch;
pub use user::{ensure_admin, DocumentUserDirectory, Role, UserDirectory, UserRecord};
