//! Application state shared across handlers

use mongodb::{Collection, Database};

use crate::auth::TokenService;
use crate::models::{CartEntry, Product, User};

/// Shared application state, built once at startup and cloned into every
/// handler. Collection handles are cheap clones over one shared client.
#[derive(Clone)]
pub struct AppState {
    pub products: Collection<Product>,
    pub users: Collection<User>,
    pub cart: Collection<CartEntry>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(db: Database, tokens: TokenService) -> Self {
        Self {
            products: db.collection("products"),
            users: db.collection("users"),
            cart: db.collection("cart"),
            tokens,
        }
    }
}
