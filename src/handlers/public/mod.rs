// Public handlers: reachable without credentials.

pub mod carts;
pub mod catalog;
pub mod status;
pub mod token;
pub mod users;

pub use carts::{add_cart_item, delete_cart_item, list_cart_items};
pub use catalog::{get_menu_item, list_menu, list_reviews};
pub use status::{banner, health};
pub use token::issue_token;
pub use users::register_user;
