//! HTTP job interface tests.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tempfile::TempDir;
use tower::ServiceExt;

use autolista::batch::BatchRunner;
use autolista::repository::{AttemptRepository, ListingRepository, SiteConfigRepository};
use autolista::server::{create_router, AppState};

use common::{fast_site, listing_html, StubFetcher, StubResponse};

fn setup_app(fetcher: StubFetcher) -> (axum::Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");

    let listings = Arc::new(ListingRepository::new(&db_path).unwrap());
    let attempts = Arc::new(AttemptRepository::new(&db_path).unwrap());
    let sites = Arc::new(SiteConfigRepository::new(&db_path).unwrap());
    sites.save(&fast_site("vitrina")).unwrap();

    let runner = Arc::new(
        BatchRunner::new(
            Arc::new(fetcher),
            listings.clone(),
            attempts.clone(),
            sites.clone(),
        )
        .with_seed(42),
    );

    let state = AppState {
        runner,
        listings,
        attempts,
        sites,
    };
    (create_router(state), dir)
}

fn post_scrape(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/scrape")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = setup_app(StubFetcher::new());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_scrape_missing_site_is_bad_request() {
    let (app, _dir) = setup_app(StubFetcher::new());
    let response = app
        .oneshot(post_scrape(serde_json::json!({ "urls": ["https://vitrina.mx/1"] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], serde_json::json!(false));
    assert!(body["error"].as_str().unwrap().contains("site"));
}

#[tokio::test]
async fn test_scrape_urls_wrong_type_is_bad_request() {
    let (app, _dir) = setup_app(StubFetcher::new());

    let response = app
        .clone()
        .oneshot(post_scrape(
            serde_json::json!({ "site": "vitrina", "urls": "not-an-array" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post_scrape(
            serde_json::json!({ "site": "vitrina", "urls": [1, 2] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_scrape(serde_json::json!({ "site": "vitrina", "urls": [] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_scrape_unknown_site_is_not_found() {
    let (app, _dir) = setup_app(StubFetcher::new());
    let response = app
        .oneshot(post_scrape(serde_json::json!({
            "site": "desconocido",
            "urls": ["https://vitrina.mx/1"],
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], serde_json::json!(false));
}

#[tokio::test]
async fn test_scrape_batch_reports_results_and_errors() {
    let fetcher = StubFetcher::new()
        .with(
            "https://vitrina.mx/1",
            StubResponse::Html(listing_html("Mazda CX-5 2022", "489,000", "22,000", "2022")),
        )
        .with("https://vitrina.mx/2", StubResponse::Blocked);
    let (app, _dir) = setup_app(fetcher);

    let response = app
        .clone()
        .oneshot(post_scrape(serde_json::json!({
            "site": "vitrina",
            "urls": ["https://vitrina.mx/1", "https://vitrina.mx/2"],
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], serde_json::json!(true));
    assert_eq!(body["site"], serde_json::json!("vitrina"));
    assert_eq!(body["processed"], serde_json::json!(1));
    assert_eq!(body["failed"], serde_json::json!(1));
    assert_eq!(body["results"][0]["listing"]["brand"], serde_json::json!("Mazda"));
    assert_eq!(body["results"][0]["listing"]["price"], serde_json::json!(489000.0));
    assert_eq!(body["errors"][0]["url"], serde_json::json!("https://vitrina.mx/2"));

    // The attempt log is visible through the monitoring endpoint.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/attempts?site=vitrina&limit=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let attempts = body_json(response).await;
    assert_eq!(attempts.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_sites_endpoint_lists_configs() {
    let (app, _dir) = setup_app(StubFetcher::new());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/sites")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sites = body_json(response).await;
    assert_eq!(sites[0]["site_id"], serde_json::json!("vitrina"));
}
