//! HTTP handlers.

mod api;
mod scrape;

pub use api::{health, list_attempts, list_sites, status};
pub use scrape::scrape_batch;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Uniform error body: `{"success": false, "error": "..."}`.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "success": false, "error": message })),
    )
        .into_response()
}
