//! Shared test fixtures: a canned-response fetcher and page builders.

#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;

use autolista::models::SiteConfig;
use autolista::scrapers::{FetchFailure, FetchRequest, FetchedPage, PageFetcher};

/// Canned response for one URL.
pub enum StubResponse {
    Html(String),
    Blocked,
    Timeout,
    Error(String),
}

/// Fetcher that serves canned responses instead of touching the network.
#[derive(Default)]
pub struct StubFetcher {
    responses: HashMap<String, StubResponse>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, response: StubResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<FetchedPage, FetchFailure> {
        match self.responses.get(request.url) {
            Some(StubResponse::Html(body)) => Ok(FetchedPage {
                body: body.clone(),
                status: 200,
            }),
            Some(StubResponse::Blocked) => Err(FetchFailure::Blocked),
            Some(StubResponse::Timeout) => Err(FetchFailure::Timeout),
            Some(StubResponse::Error(message)) => Err(FetchFailure::Failed(message.clone())),
            None => Err(FetchFailure::Failed("HTTP 404".to_string())),
        }
    }
}

/// A plausible listing page for the given headline fields.
pub fn listing_html(title: &str, price: &str, mileage: &str, year: &str) -> String {
    format!(
        r#"<html>
        <head><title>{title} | Vitrina Autos</title></head>
        <body>
            <h1>{title}</h1>
            <span class="listing-price">$ {price}</span>
            <table>
                <tr><th>Año</th><td>{year}</td></tr>
                <tr><th>Kilometraje</th><td>{mileage} km</td></tr>
                <tr><th>Color</th><td>Blanco</td></tr>
            </table>
            <div class="seller-location">Guadalajara, Jalisco</div>
            <img src="https://img.vitrina.mx/autos/1/front.jpg">
        </body>
        </html>"#
    )
}

/// Site config with pacing disabled so tests run instantly.
pub fn fast_site(site_id: &str) -> SiteConfig {
    let mut config = SiteConfig::new(site_id);
    config.delay_seconds = 0.0;
    config.max_requests_per_minute = 0;
    config
}
