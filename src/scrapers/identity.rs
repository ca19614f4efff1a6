//! Outbound identity rotation.
//!
//! Each request goes out with a randomly chosen user-agent so repeated
//! fetches against the same site don't present a single fingerprint.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Realistic desktop browser identities used when a site config does not
/// supply its own pool. Spans Windows/Mac/Linux and three engines.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36",
    // Chrome on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36",
    // Chrome on Linux
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36",
    // Firefox on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:141.0) Gecko/20100101 Firefox/141.0",
    // Firefox on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:141.0) Gecko/20100101 Firefox/141.0",
    // Safari on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.5 Safari/605.1.15",
    // Edge on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36 Edg/139.0.0.0",
];

/// Picks a random identity per request.
///
/// Holds its own RNG so tests can pin the seed and assert deterministic
/// choices.
#[derive(Debug)]
pub struct IdentityRotator {
    pool: Vec<String>,
    rng: StdRng,
}

impl IdentityRotator {
    /// Create a rotator over the given pool, falling back to the built-in
    /// pool when it is empty.
    pub fn new(custom_pool: &[String]) -> Self {
        Self::with_rng(custom_pool, StdRng::from_entropy())
    }

    /// Create a rotator with a fixed seed for deterministic tests.
    pub fn with_seed(custom_pool: &[String], seed: u64) -> Self {
        Self::with_rng(custom_pool, StdRng::seed_from_u64(seed))
    }

    fn with_rng(custom_pool: &[String], rng: StdRng) -> Self {
        let pool = if custom_pool.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect()
        } else {
            custom_pool.to_vec()
        };
        Self { pool, rng }
    }

    /// Pick an identity uniformly at random. Always returns a value.
    pub fn pick(&mut self) -> String {
        self.pool
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_USER_AGENTS[0].to_string())
    }

    /// Pick uniformly from an arbitrary pool, e.g. proxy endpoints.
    /// Returns `None` for an empty pool.
    pub fn pick_from<'a>(&mut self, pool: &'a [String]) -> Option<&'a str> {
        pool.choose(&mut self.rng).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_when_custom_empty() {
        let mut rotator = IdentityRotator::with_seed(&[], 7);
        let picked = rotator.pick();
        assert!(DEFAULT_USER_AGENTS.contains(&picked.as_str()));
    }

    #[test]
    fn test_custom_pool_used() {
        let pool = vec!["TestAgent/1.0".to_string(), "TestAgent/2.0".to_string()];
        let mut rotator = IdentityRotator::with_seed(&pool, 7);
        for _ in 0..10 {
            assert!(pool.contains(&rotator.pick()));
        }
    }

    #[test]
    fn test_seeded_rotation_is_deterministic() {
        let mut first = IdentityRotator::with_seed(&[], 42);
        let mut second = IdentityRotator::with_seed(&[], 42);
        for _ in 0..10 {
            assert_eq!(first.pick(), second.pick());
        }
    }

    #[test]
    fn test_default_pool_spans_engines() {
        let joined = DEFAULT_USER_AGENTS.join(" ");
        assert!(DEFAULT_USER_AGENTS.len() >= 5);
        assert!(joined.contains("Chrome"));
        assert!(joined.contains("Firefox"));
        assert!(joined.contains("Windows"));
        assert!(joined.contains("Macintosh"));
    }

    #[test]
    fn test_pick_from_empty_pool() {
        let mut rotator = IdentityRotator::with_seed(&[], 1);
        assert_eq!(rotator.pick_from(&[]), None);
    }
}
