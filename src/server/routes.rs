//! Router configuration for the web server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/scrape", post(handlers::scrape_batch))
        .route("/api/sites", get(handlers::list_sites))
        .route("/api/attempts", get(handlers::list_attempts))
        .route("/api/status", get(handlers::status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
