//! # TaskNest API Server
//!
//! This is the main API server for TaskNest, providing JWT-authenticated
//! endpoints for user accounts and owner-scoped task management.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Authentication endpoints (signup, signin)
//! - Task CRUD with pagination, filtering, and multi-key sorting
//! - Identity middleware (strict on task routes, permissive elsewhere)
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasknest-api
//! ```

use chrono::Duration;
use tasknest_api::{
    app::{build_router, AppState},
    config::Config,
};
use tasknest_shared::{
    auth::{jwt::TokenCodec, service::AuthService},
    db,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasknest_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskNest API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    // Initialize database pool and bring the schema up to date
    let pool = db::pool::create_pool(db::pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    db::migrations::run_migrations(&pool).await?;

    // Build the token codec; this is where a too-short JWT_SECRET fails
    let codec = TokenCodec::new(&config.auth.jwt_secret)?;
    let auth = AuthService::with_token_lifetimes(
        pool.clone(),
        codec,
        Duration::seconds(config.auth.access_token_expire_seconds),
        Duration::seconds(config.auth.refresh_token_expire_seconds),
    );

    // Build Axum application
    let state = AppState::new(pool.clone(), config, auth);
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db::pool::close_pool(pool).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves when the process receives Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
