//! Batch scrape endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::super::AppState;
use super::error_response;
use crate::batch::BatchError;

/// `POST /api/scrape`: run one batch.
///
/// Body: `{"site": "...", "urls": ["https://...", ...]}`. The body is
/// validated by hand so malformed input gets a descriptive client error
/// instead of a bare rejection.
pub async fn scrape_batch(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let site = match body.get("site").and_then(|v| v.as_str()) {
        Some(site) if !site.is_empty() => site.to_string(),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "missing or invalid 'site': expected a non-empty string",
            )
        }
    };

    let urls = match body.get("urls").and_then(|v| v.as_array()) {
        Some(values) => {
            let urls: Option<Vec<String>> = values
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect();
            match urls {
                Some(urls) if !urls.is_empty() => urls,
                Some(_) => {
                    return error_response(StatusCode::BAD_REQUEST, "'urls' must not be empty")
                }
                None => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        "missing or invalid 'urls': expected an array of strings",
                    )
                }
            }
        }
        None => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "missing or invalid 'urls': expected an array of strings",
            )
        }
    };

    match state.runner.run(&site, &urls).await {
        Ok(summary) => Json(serde_json::json!({
            "success": true,
            "site": summary.site,
            "processed": summary.processed,
            "failed": summary.failed,
            "results": summary.results,
            "errors": summary.errors,
        }))
        .into_response(),
        Err(BatchError::UnknownSite(site)) => error_response(
            StatusCode::NOT_FOUND,
            &format!("no active configuration for site '{}'", site),
        ),
        Err(err) => {
            tracing::error!("batch failed before starting: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}
