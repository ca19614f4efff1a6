//! Monitoring endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use super::super::AppState;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// `GET /api/sites`: configured sites with last-run timestamps.
pub async fn list_sites(State(state): State<AppState>) -> impl IntoResponse {
    let sites: Vec<_> = state
        .sites
        .get_all()
        .unwrap_or_default()
        .into_iter()
        .map(|site| {
            let listing_count = state.listings.count_by_site(&site.site_id).unwrap_or(0);
            serde_json::json!({
                "site_id": site.site_id,
                "name": site.name,
                "delay_seconds": site.delay_seconds,
                "max_requests_per_minute": site.max_requests_per_minute,
                "last_run_at": site.last_run_at,
                "listings": listing_count,
            })
        })
        .collect();

    axum::Json(sites).into_response()
}

/// Parameters for the attempt log endpoint.
#[derive(Debug, Deserialize)]
pub struct AttemptParams {
    pub site: String,
    pub limit: Option<usize>,
}

/// `GET /api/attempts?site=&limit=`: recent attempt log entries.
pub async fn list_attempts(
    State(state): State<AppState>,
    Query(params): Query<AttemptParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(50);
    let attempts = state.attempts.recent(&params.site, limit).unwrap_or_default();
    axum::Json(attempts).into_response()
}

/// `GET /api/status`: overall database status.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let listing_count = state.listings.count().unwrap_or(0);

    let site_stats: Vec<_> = state
        .sites
        .get_all()
        .unwrap_or_default()
        .into_iter()
        .map(|site| {
            let outcomes = state.attempts.outcome_counts(&site.site_id).unwrap_or_default();
            serde_json::json!({
                "site_id": site.site_id,
                "last_run_at": site.last_run_at,
                "attempts": outcomes
                    .into_iter()
                    .map(|(outcome, count)| serde_json::json!({ "outcome": outcome, "count": count }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    axum::Json(serde_json::json!({
        "listings": listing_count,
        "sites": site_stats,
    }))
    .into_response()
}
