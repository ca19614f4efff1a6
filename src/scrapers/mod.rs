//! Polite page fetching: identity rotation, randomized pacing, and the
//! HTTP client seam used by the batch orchestrator.

mod fetch;
mod identity;
mod pacing;

pub use fetch::{FetchFailure, FetchRequest, FetchedPage, HttpFetcher, PageFetcher, REQUEST_TIMEOUT};
pub use identity::{IdentityRotator, DEFAULT_USER_AGENTS};
pub use pacing::Pacer;
