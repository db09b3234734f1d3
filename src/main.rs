//! Profile Service - Main Application Entry Point
//!
//! A REST API server for a "profile" resource: create, read, JSON merge-patch
//! update, soft/hard delete, and search by any combination of fields.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Keys**: Ed25519 key pair generated for every new profile
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build the public (health) and private (API) routers
//! 5. Serve both listeners until one of them fails

mod clock;
mod config;
mod db;
mod error;
mod handlers;
mod keys;
mod models;
mod routes;
mod services;
mod state;
mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{services::search::SearchOptions, state::AppState, store::PgProfileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let state = AppState::new(
        Arc::new(PgProfileStore::new(pool)),
        SearchOptions {
            include_deleted: config.search_include_deleted,
        },
    );

    let public_app = routes::public_router(state.clone());
    let private_app = routes::private_router(state);

    let public_listener = tokio::net::TcpListener::bind(&config.public_addr).await?;
    tracing::info!("Public server listening on {}", config.public_addr);

    let private_listener = tokio::net::TcpListener::bind(&config.private_addr).await?;
    tracing::info!("Private server listening on {}", config.private_addr);

    tokio::try_join!(
        axum::serve(public_listener, public_app).into_future(),
        axum::serve(private_listener, private_app).into_future(),
    )?;

    Ok(())
}
