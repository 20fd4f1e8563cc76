//! Squadspace API - the squad's shared backend
//!
//! A small private-group server: member accounts, a shared post feed,
//! direct messages, a squad calendar, and a pooled wallet where withdrawals
//! are released by member vote once two thirds of the squad approve.

mod auth;
mod config;
mod db;
mod error;
mod members;
mod models;
mod notifications;
mod routes;
mod state;
mod wallet;

use crate::config::Settings;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("Starting Squadspace API...");

    // Load configuration
    let settings = Settings::load()?;
    info!("Configuration loaded successfully");

    if std::env::var("JWT_SECRET").is_err() {
        warn!("JWT_SECRET not set, using default (INSECURE - set in production!)");
    }

    // Initialize database pool - required, no in-memory fallback
    let state = match db::create_pool(&settings.database).await {
        Ok(pool) => {
            info!("Database pool created successfully");

            db::init_schema(&pool).await?;

            Arc::new(AppState::new(pool))
        }
        Err(e) => {
            error!("FATAL: Failed to initialize database pool: {}", e);
            error!("DATABASE_URL must be set in .env and the database must be reachable");
            anyhow::bail!("Cannot start server without database connection");
        }
    };

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("Server listening on http://{}", addr);
    info!("");
    info!("API Endpoints:");
    info!("   ___ Authentication ___");
    info!("   POST   /api/auth/register           - Register a new member");
    info!("   POST   /api/auth/login              - Login with username/password");
    info!("   POST   /api/auth/refresh            - Refresh access token");
    info!("   GET    /api/auth/me                 - Current member");
    info!("   DELETE /api/auth/account            - Delete account");
    info!("");
    info!("   ___ Squad ___");
    info!("   GET    /api/members                 - Other members");
    info!("   GET    /api/feed                    - Shared feed");
    info!("   POST   /api/posts                   - Create post");
    info!("   GET    /api/calendar                - Shared calendar");
    info!("   GET    /api/messages/{{peer_id}}      - Conversation");
    info!("   GET    /api/notifications           - Notification inbox");
    info!("");
    info!("   ___ Shared Wallet ___");
    info!("   GET    /api/wallet                  - Balances, history, requests");
    info!("   POST   /api/wallet/contributions    - Pitch into the pool");
    info!("   POST   /api/wallet/withdrawals      - Request a withdrawal");
    info!("   POST   /api/wallet/withdrawals/{{id}}/vote - Vote to approve");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,squadspace_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
