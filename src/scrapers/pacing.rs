//! Randomized request pacing.
//!
//! Sequential batches sleep between requests so the configured minimum
//! inter-request interval is honored. The delay is the site's base interval
//! plus up to 50% random jitter, so request timing doesn't form a clean
//! periodic signal.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Inserts randomized delays between requests for one site.
#[derive(Debug)]
pub struct Pacer {
    base: Duration,
    rng: StdRng,
}

impl Pacer {
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a pacer with a fixed seed for deterministic tests.
    pub fn with_seed(base: Duration, seed: u64) -> Self {
        Self {
            base,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Compute the next delay: base interval plus jitter in [0, base/2).
    pub fn next_delay(&mut self) -> Duration {
        if self.base.is_zero() {
            return Duration::ZERO;
        }
        let jitter = self.rng.gen_range(0.0..0.5);
        self.base.mul_f64(1.0 + jitter)
    }

    /// Sleep for the next randomized delay.
    pub async fn pause(&mut self) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        debug!("pacing: sleeping {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_bounded_by_base_interval() {
        let base = Duration::from_secs(2);
        let mut pacer = Pacer::with_seed(base, 3);
        for _ in 0..100 {
            let delay = pacer.next_delay();
            assert!(delay >= base);
            assert!(delay < base.mul_f64(1.5));
        }
    }

    #[test]
    fn test_seeded_delays_are_deterministic() {
        let base = Duration::from_millis(500);
        let mut first = Pacer::with_seed(base, 11);
        let mut second = Pacer::with_seed(base, 11);
        for _ in 0..10 {
            assert_eq!(first.next_delay(), second.next_delay());
        }
    }

    #[test]
    fn test_zero_base_means_no_delay() {
        let mut pacer = Pacer::with_seed(Duration::ZERO, 1);
        assert_eq!(pacer.next_delay(), Duration::ZERO);
    }
}
