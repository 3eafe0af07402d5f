//! Request interceptors composed ahead of the handlers

pub mod auth;
