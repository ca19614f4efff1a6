//! HTTP page fetching with bounded timeouts.
//!
//! The batch orchestrator talks to a [`PageFetcher`] trait object so tests
//! can substitute a stub; [`HttpFetcher`] is the reqwest-backed production
//! implementation.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::models::AttemptOutcome;

/// Bound on a single page fetch.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Network-level failure taxonomy for one fetch attempt.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// The site rate-limited us.
    #[error("rate limited (HTTP 429)")]
    Blocked,
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Failed(String),
}

impl FetchFailure {
    /// Map the failure to its attempt-log outcome category.
    pub fn outcome(&self) -> AttemptOutcome {
        match self {
            Self::Blocked => AttemptOutcome::Blocked,
            Self::Timeout => AttemptOutcome::Timeout,
            Self::Failed(_) => AttemptOutcome::Error,
        }
    }
}

/// One outbound request, fully resolved by the orchestrator.
#[derive(Debug)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    /// User-agent string chosen by the identity rotator.
    pub identity: &'a str,
    /// Site-configured headers merged into the request.
    pub headers: &'a BTreeMap<String, String>,
    /// Proxy endpoint for this batch, if the site config supplies a pool.
    pub proxy: Option<&'a str>,
}

/// A successfully fetched page.
#[derive(Debug)]
pub struct FetchedPage {
    pub body: String,
    pub status: u16,
}

/// Seam between the orchestrator and the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<FetchedPage, FetchFailure>;
}

/// reqwest-backed fetcher with a 30-second deadline per request.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .gzip(true)
            .brotli(true)
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Client for one request. Proxied requests get a one-off client since
    /// reqwest binds proxies at build time; batches are sequential and
    /// low-rate, so the rebuild cost is irrelevant.
    fn client_for(&self, proxy: Option<&str>) -> Result<Client, FetchFailure> {
        let proxy_url = match proxy {
            Some(proxy_url) => proxy_url,
            None => return Ok(self.client.clone()),
        };
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|err| FetchFailure::Failed(format!("invalid proxy {}: {}", proxy_url, err)))?;
        Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .gzip(true)
            .brotli(true)
            .proxy(proxy)
            .build()
            .map_err(|err| FetchFailure::Failed(err.to_string()))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<FetchedPage, FetchFailure> {
        let client = self.client_for(request.proxy)?;

        let mut outbound = client
            .get(request.url)
            .header(reqwest::header::USER_AGENT, request.identity);
        for (name, value) in request.headers {
            outbound = outbound.header(name.as_str(), value.as_str());
        }

        debug!("GET {}", request.url);
        let response = outbound.send().await.map_err(classify)?;
        let status = response.status();

        if status.as_u16() == 429 {
            return Err(FetchFailure::Blocked);
        }
        if !status.is_success() {
            return Err(FetchFailure::Failed(format!("HTTP {}", status.as_u16())));
        }

        let body = response.text().await.map_err(classify)?;
        Ok(FetchedPage {
            body,
            status: status.as_u16(),
        })
    }
}

fn classify(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::Failed(err.to_string())
    }
}
