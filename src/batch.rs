//! Batch orchestration: pace → fetch → extract → score → persist → log.
//!
//! One batch processes a list of URLs for a single site, sequentially. A
//! failing URL never aborts the batch; its outcome is recorded and the loop
//! moves on. Every URL ends up in exactly one of the summary's `results` or
//! `errors`.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extractor::{content_hash, is_low_confidence, quality_score, ListingExtractor};
use crate::models::{AttemptOutcome, Listing, ScrapeAttempt, SiteConfig};
use crate::repository::{
    AttemptRepository, ListingRepository, RepositoryError, SiteConfigRepository,
};
use crate::scrapers::{FetchRequest, IdentityRotator, Pacer, PageFetcher};

/// Failures that prevent a batch from starting. Per-URL failures are not
/// errors at this level; they land in the summary instead.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no active configuration for site '{0}'")]
    UnknownSite(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One successfully processed URL.
#[derive(Debug, Serialize)]
pub struct UrlSuccess {
    pub url: String,
    pub listing: Listing,
    pub quality_score: u32,
    pub latency_ms: u64,
}

/// One failed URL.
#[derive(Debug, Serialize)]
pub struct UrlFailure {
    pub url: String,
    pub error: String,
}

/// Aggregate result of one batch run.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub site: String,
    pub processed: usize,
    pub failed: usize,
    pub results: Vec<UrlSuccess>,
    pub errors: Vec<UrlFailure>,
}

enum UrlOutcome {
    Success(Box<UrlSuccess>),
    Failure(UrlFailure),
}

/// Drives fetch→extract→score→upsert→log for a list of URLs.
///
/// All collaborators are injected; nothing here reaches for globals.
pub struct BatchRunner {
    fetcher: Arc<dyn PageFetcher>,
    extractor: ListingExtractor,
    listings: Arc<ListingRepository>,
    attempts: Arc<AttemptRepository>,
    sites: Arc<SiteConfigRepository>,
    /// Fixed RNG seed for pacing and identity choice; tests only.
    seed: Option<u64>,
}

impl BatchRunner {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        listings: Arc<ListingRepository>,
        attempts: Arc<AttemptRepository>,
        sites: Arc<SiteConfigRepository>,
    ) -> Self {
        Self {
            fetcher,
            extractor: ListingExtractor::new(),
            listings,
            attempts,
            sites,
            seed: None,
        }
    }

    /// Pin the pacing/identity RNG for deterministic tests.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run one batch for a site.
    ///
    /// The configuration is read once and treated as immutable for the
    /// duration of the run. The site's last-run timestamp is stamped exactly
    /// once at the end, regardless of per-URL failures.
    pub async fn run(&self, site_id: &str, urls: &[String]) -> Result<BatchSummary, BatchError> {
        let config = self
            .sites
            .get(site_id)?
            .ok_or_else(|| BatchError::UnknownSite(site_id.to_string()))?;

        let mut rotator = match self.seed {
            Some(seed) => IdentityRotator::with_seed(&config.user_agents, seed),
            None => IdentityRotator::new(&config.user_agents),
        };
        let mut pacer = match self.seed {
            Some(seed) => Pacer::with_seed(config.base_interval(), seed),
            None => Pacer::new(config.base_interval()),
        };
        // One proxy per batch; rebinding per request would churn identities
        // faster than it hides them.
        let proxy = rotator.pick_from(&config.proxies).map(str::to_string);

        info!(site = site_id, urls = urls.len(), "starting batch");

        let mut results = Vec::new();
        let mut errors = Vec::new();

        for url in urls {
            pacer.pause().await;
            let identity = rotator.pick();
            match self
                .process_url(&config, url, &identity, proxy.as_deref())
                .await
            {
                UrlOutcome::Success(success) => results.push(*success),
                UrlOutcome::Failure(failure) => errors.push(failure),
            }
        }

        // Best effort; a missed stamp must not fail an otherwise good batch.
        if let Err(err) = self.sites.update_last_run(site_id, Utc::now()) {
            warn!(site = site_id, "failed to update last-run timestamp: {}", err);
        }

        info!(
            site = site_id,
            processed = results.len(),
            failed = errors.len(),
            "batch finished"
        );

        Ok(BatchSummary {
            site: site_id.to_string(),
            processed: results.len(),
            failed: errors.len(),
            results,
            errors,
        })
    }

    /// Process a single URL to a terminal state.
    async fn process_url(
        &self,
        config: &SiteConfig,
        url: &str,
        identity: &str,
        proxy: Option<&str>,
    ) -> UrlOutcome {
        let start = Instant::now();

        let request = FetchRequest {
            url,
            identity,
            headers: &config.headers,
            proxy,
        };

        let page = match self.fetcher.fetch(request).await {
            Ok(page) => page,
            Err(failure) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                let message = failure.to_string();
                self.log_attempt(ScrapeAttempt::new(
                    &config.site_id,
                    url,
                    failure.outcome(),
                    Some(message.clone()),
                    latency_ms,
                    identity,
                ));
                return UrlOutcome::Failure(UrlFailure {
                    url: url.to_string(),
                    error: message,
                });
            }
        };

        debug!(url, status = page.status, "page fetched");

        let extracted = self.extractor.extract(&page.body, config);
        let score = quality_score(&extracted);
        if is_low_confidence(score) {
            warn!(site = %config.site_id, url, score, "low-confidence extraction");
        }
        let hash = content_hash(&extracted);

        match self
            .listings
            .upsert(&config.site_id, url, extracted, hash)
        {
            Ok((listing, created)) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                debug!(url, created, "listing persisted");
                self.log_attempt(ScrapeAttempt::new(
                    &config.site_id,
                    url,
                    AttemptOutcome::Success,
                    None,
                    latency_ms,
                    identity,
                ));
                UrlOutcome::Success(Box::new(UrlSuccess {
                    url: url.to_string(),
                    listing,
                    quality_score: score,
                    latency_ms,
                }))
            }
            Err(err) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                let message = format!("persistence failed: {}", err);
                self.log_attempt(ScrapeAttempt::new(
                    &config.site_id,
                    url,
                    AttemptOutcome::Error,
                    Some(message.clone()),
                    latency_ms,
                    identity,
                ));
                UrlOutcome::Failure(UrlFailure {
                    url: url.to_string(),
                    error: message,
                })
            }
        }
    }

    /// Attempt logging is observability, never control flow: failures are
    /// swallowed and reported to local diagnostics only.
    fn log_attempt(&self, attempt: ScrapeAttempt) {
        if let Err(err) = self.attempts.log(&attempt) {
            warn!(url = %attempt.url, "failed to record attempt: {}", err);
        }
    }
}
