//! Fablya Backend Server
//!
//! Single-process HTTP server for the Fablya storefront: public catalog and
//! login routes plus bearer-token gated profile and cart routes, backed by
//! one shared MongoDB client.

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use mongodb::Client;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use fablya_server::app_state::AppState;
use fablya_server::auth::TokenService;
use fablya_server::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Get configuration from environment
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .context("PORT must be a number")?;
    let db_uri = std::env::var("DB_URI").context("DB_URI must be set")?;
    let db_name = std::env::var("DB_NAME").unwrap_or_else(|_| "Fablya".to_string());
    let token_secret =
        std::env::var("ACCESS_TOKEN_SECRET").context("ACCESS_TOKEN_SECRET must be set")?;

    // Initialize the shared database client
    tracing::info!("Connecting to database...");
    let client = Client::with_uri_str(&db_uri)
        .await
        .context("Failed to initialize MongoDB client")?;

    // Create shared app state
    let app_state = AppState::new(client.database(&db_name), TokenService::new(&token_secret));

    // Create the app router
    let app = Router::new()
        .route("/", get(root))
        .merge(routes::catalog_routes())
        .merge(routes::user_routes())
        .merge(routes::cart_routes())
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(configure_cors());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn root() -> &'static str {
    "server is running"
}

fn configure_cors() -> CorsLayer {
    let allowed_origins_str = std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();

    if allowed_origins_str.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins_str
        .split(',')
        .map(|s| s.trim().parse().expect("Invalid CORS origin"))
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
        .allow_headers(Any)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        tracing::info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
