//! Jittered exponential backoff between startup connection attempts.

use rand::Rng;
use std::time::Duration;

use crate::config::BreakerConfig;

/// Delay schedule for repeated ping attempts against one server.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    pub fn from_config(config: &BreakerConfig) -> Self {
        Self::new(config.retry_backoff_ms, config.retry_backoff_max_ms)
    }

    /// Delay before attempt number `attempt` (the first attempt is 0 and
    /// never waits).
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 || self.base_ms == 0 {
            return Duration::ZERO;
        }

        let doubled = self.base_ms.saturating_mul(2u64.saturating_pow(attempt - 1));
        let capped = doubled.min(self.max_ms);

        // Up to 10% jitter so servers sharing a host don't retry in lockstep.
        let jitter = match capped / 10 {
            0 => 0,
            range => rand::thread_rng().gen_range(0..range),
        };

        Duration::from_millis(capped + jitter)
    }
}
