//! Per-site extraction configuration.
//!
//! Site configurations are owned by an external configuration process; this
//! subsystem reads one per batch run and only ever writes back the last-run
//! timestamp.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration for scraping one source site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Stable identifier, e.g. "seminuevos-mx".
    pub site_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Named CSS selector hints. Advisory only; the heuristic extractor
    /// works without them.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub selector_hints: BTreeMap<String, String>,
    /// Extra headers merged into every outbound request.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Base delay between requests, in seconds.
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: f64,
    /// Upper bound on request rate.
    #[serde(default = "default_max_requests_per_minute")]
    pub max_requests_per_minute: u32,
    /// Candidate user-agent strings. Empty means use the built-in pool.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_agents: Vec<String>,
    /// Candidate proxy endpoints. Unused when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<String>,
    /// Hosts the site serves listing photos from. Image URLs on other hosts
    /// are dropped; an empty list disables the host filter.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media_hosts: Vec<String>,
    /// When this config row was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// When a batch last ran against this site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<DateTime<Utc>>,
}

fn default_delay_seconds() -> f64 {
    2.0
}

fn default_max_requests_per_minute() -> u32 {
    20
}

impl SiteConfig {
    /// Create a config with defaults for everything but the identifier.
    pub fn new(site_id: &str) -> Self {
        Self {
            site_id: site_id.to_string(),
            name: site_id.to_string(),
            selector_hints: BTreeMap::new(),
            headers: BTreeMap::new(),
            delay_seconds: default_delay_seconds(),
            max_requests_per_minute: default_max_requests_per_minute(),
            user_agents: Vec::new(),
            proxies: Vec::new(),
            media_hosts: Vec::new(),
            created_at: Utc::now(),
            last_run_at: None,
        }
    }

    /// Base pacing interval, clamped so the configured requests-per-minute
    /// ceiling is honored even when `delay_seconds` is set too low.
    pub fn base_interval(&self) -> Duration {
        let from_delay = Duration::from_secs_f64(self.delay_seconds.max(0.0));
        if self.max_requests_per_minute == 0 {
            return from_delay;
        }
        let floor = Duration::from_secs_f64(60.0 / self.max_requests_per_minute as f64);
        from_delay.max(floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_interval_uses_delay() {
        let mut config = SiteConfig::new("vitrina");
        config.delay_seconds = 5.0;
        config.max_requests_per_minute = 60;
        assert_eq!(config.base_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_base_interval_respects_rate_ceiling() {
        let mut config = SiteConfig::new("vitrina");
        config.delay_seconds = 0.5;
        config.max_requests_per_minute = 10;
        // 10 requests/minute means at least 6 seconds between requests.
        assert_eq!(config.base_interval(), Duration::from_secs(6));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: SiteConfig =
            serde_json::from_str(r#"{"site_id": "vitrina"}"#).unwrap();
        assert_eq!(config.delay_seconds, 2.0);
        assert_eq!(config.max_requests_per_minute, 20);
        assert!(config.user_agents.is_empty());
        assert!(config.last_run_at.is_none());
    }
}
