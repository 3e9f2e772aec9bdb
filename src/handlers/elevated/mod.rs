// Handlers behind auth gate + role gate. Reaching one means the caller
// was verified as an admin against the user store for this request.

pub mod menu;
pub mod users;

pub use menu::{create_menu_item, delete_menu_item, update_menu_item};
pub use users::{delete_user, list_users, promote_user};
