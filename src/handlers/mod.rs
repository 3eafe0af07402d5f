//! API handlers for the Fablya backend

pub mod cart;
pub mod catalog;
pub mod profile;
pub mod users;

pub use cart::{add_to_cart, user_cart};
pub use catalog::{get_product, list_products};
pub use profile::{update_user_info, user_info};
pub use users::{login_with_email, login_with_phone};

// Re-export the auth extractors for handler use
pub use crate::middleware::auth::{AdminUser, AuthenticatedUser, MemberUser};
