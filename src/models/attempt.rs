//! Scrape attempt audit log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome category of one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Error,
    /// The site rate-limited us (HTTP 429).
    Blocked,
    Timeout,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Blocked => "blocked",
            Self::Timeout => "timeout",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            "blocked" => Some(Self::Blocked),
            "timeout" => Some(Self::Timeout),
            _ => None,
        }
    }
}

/// One audit entry per fetch attempt. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeAttempt {
    /// Database row ID.
    pub id: i64,
    pub site_id: String,
    pub url: String,
    pub outcome: AttemptOutcome,
    pub message: Option<String>,
    /// Wall-clock time from request start to completion.
    pub latency_ms: u64,
    /// User-agent string used for the request.
    pub identity: String,
    pub created_at: DateTime<Utc>,
}

impl ScrapeAttempt {
    /// Create a new attempt entry stamped with the current time.
    pub fn new(
        site_id: &str,
        url: &str,
        outcome: AttemptOutcome,
        message: Option<String>,
        latency_ms: u64,
        identity: &str,
    ) -> Self {
        Self {
            id: 0, // Set by database
            site_id: site_id.to_string(),
            url: url.to_string(),
            outcome,
            message,
            latency_ms,
            identity: identity.to_string(),
            created_at: Utc::now(),
        }
    }
}
