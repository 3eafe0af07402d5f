//! Fablya Backend Library
//!
//! This library exports the core modules for the Fablya storefront backend
//! server: catalog reads, login-or-register identity upserts, and
//! bearer-token gated profile and cart routes over MongoDB.

pub mod app_state;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
