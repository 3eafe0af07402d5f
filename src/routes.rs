//! Route definitions for the Fablya API

use axum::{
    routing::{get, put},
    Router,
};

use crate::app_state::AppState;
use crate::handlers::*;

// Public catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/product/:id", get(get_product))
}

// Login and profile routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/:email", put(login_with_email))
        .route("/phone_user/:number", put(login_with_phone))
        .route("/userInfo", get(user_info))
        .route("/updateUserInfo", put(update_user_info))
}

// Cart routes
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/user_cart", get(user_cart))
        .route("/addToCart/:id", put(add_to_cart))
}
