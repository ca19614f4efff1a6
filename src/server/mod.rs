//! HTTP job interface for triggering scrape batches.
//!
//! Exposes the batch orchestrator as a JSON API:
//! - `POST /api/scrape` runs one batch for a site
//! - `GET /api/sites`, `/api/attempts`, `/api/status` for monitoring

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::batch::BatchRunner;
use crate::config::Settings;
use crate::repository::{AttemptRepository, ListingRepository, SiteConfigRepository};
use crate::scrapers::HttpFetcher;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<BatchRunner>,
    pub listings: Arc<ListingRepository>,
    pub attempts: Arc<AttemptRepository>,
    pub sites: Arc<SiteConfigRepository>,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let listings = Arc::new(ListingRepository::new(&settings.db_path)?);
        let attempts = Arc::new(AttemptRepository::new(&settings.db_path)?);
        let sites = Arc::new(SiteConfigRepository::new(&settings.db_path)?);

        let runner = Arc::new(BatchRunner::new(
            Arc::new(HttpFetcher::new()),
            listings.clone(),
            attempts.clone(),
            sites.clone(),
        ));

        Ok(Self {
            runner,
            listings,
            attempts,
            sites,
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
