//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod auth;
mod calendar;
mod chat;
mod feed;
mod members;
mod notifications;
mod wallet;

use crate::auth::auth_middleware;
use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware_stack = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    // Everything behind the auth middleware; handlers read Claims from
    // request extensions
    let protected = Router::new()
        // Identity
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/account", delete(auth::delete_account))
        .route("/api/members", get(members::list_members))
        .route("/api/profile", get(members::get_profile).put(members::update_profile))
        // Feed
        .route("/api/feed", get(feed::feed))
        .route("/api/posts", post(feed::create_post))
        .route("/api/posts/{id}", delete(feed::delete_post))
        // Calendar
        .route("/api/calendar", get(calendar::list_events).post(calendar::create_event))
        .route("/api/calendar/{id}", delete(calendar::delete_event))
        // Direct messages
        .route("/api/messages/{peer_id}", get(chat::conversation).post(chat::send_message))
        .route("/api/messages/{peer_id}/{message_id}", delete(chat::delete_message))
        // Notifications
        .route("/api/notifications", get(notifications::list_notifications))
        .route("/api/notifications/unread", get(notifications::unread_counts))
        // Shared wallet
        .route("/api/wallet", get(wallet::overview))
        .route("/api/wallet/contributions", post(wallet::contribute))
        .route("/api/wallet/withdrawals", post(wallet::request_withdrawal))
        .route("/api/wallet/withdrawals/{id}/vote", post(wallet::vote))
        .route("/api/wallet/withdrawals/{id}", delete(wallet::delete_withdrawal))
        .route_layer(middleware::from_fn(auth_middleware));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Open auth endpoints
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .merge(protected)
        // Apply middleware and state
        .layer(middleware_stack)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .max_age(Duration::from_secs(3600))
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .max_age(Duration::from_secs(3600))
    }
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
