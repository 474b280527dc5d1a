//! Main entry point for the Safety Campaign Console backend.
//!
//! This file initializes logging and the Axum web server, sets up the database pool,
//! applies migrations, discovers the credential store's optional columns and registers
//! the login flow, the protected pages and the JSON API.

mod api;
mod auth;
mod config;
mod context;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use crate::api::common::ApiResponse;
use crate::services::account_service::AccountService;
use crate::services::session_service::SessionService;
use anyhow::{Context, Result};
use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use context::AppContext;
use database::Database;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let db = Database::new(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to apply migrations")?;
    let pool = db.pool().clone();

    let ctx = Arc::new(AppContext::initialize(config, &pool).await?);
    info!(
        has_username = ctx.capabilities.has_username,
        has_last_login = ctx.capabilities.has_last_login,
        bcrypt_cost = ctx.password_policy.cost(),
        "Credential store ready"
    );

    if let Some(bootstrap) = &ctx.config.bootstrap_account {
        if let Some(id) = AccountService::new(&pool, &ctx)
            .ensure_bootstrap_account(bootstrap)
            .await?
        {
            info!(account_id = id, "Bootstrap account provisioned");
        }
    }

    spawn_session_sweeper(pool.clone(), ctx.clone());

    let app = build_router(pool, ctx.clone());

    let bind_address = format!("0.0.0.0:{}", ctx.config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Starting console server on port {}", ctx.config.server_port);
    axum::serve(listener, app).await?;

    db.close().await;
    Ok(())
}

/// Assembles the application router.
fn build_router(pool: SqlitePool, ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .merge(auth::routes::auth_router())
        .nest("/api/session", api::session::routes::session_router())
        .layer(Extension(pool))
        .layer(Extension(ctx))
}

/// Deletes expired sessions on a fixed interval.
fn spawn_session_sweeper(pool: SqlitePool, ctx: Arc<AppContext>) {
    let period = Duration::from_secs(ctx.config.session_sweep_interval_seconds.max(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match SessionService::new(&pool, ctx.config.session_ttl_seconds)
                .purge_expired()
                .await
            {
                Ok(0) => {}
                Ok(purged) => info!(purged, "Expired sessions removed"),
                Err(e) if pool.is_closed() => {
                    warn!("Session sweeper stopping: {}", e);
                    break;
                }
                Err(e) => error!("Session sweep failed: {:#}", e),
            }
        }
    });
}

async fn root_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
) -> axum::response::Redirect {
    axum::response::Redirect::to(&ctx.config.landing_path)
}

async fn health_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Safety Campaign Console",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "OK",
    ))
}
