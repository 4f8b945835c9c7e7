//! Active liveness probing.
//!
//! # Responsibilities
//! - Periodically ping each registered connection
//! - Record probe failures in the connection's circuit breaker

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::backend::Connection;
use crate::observability::metrics;

/// Recurring liveness probe for one connection.
pub struct LivenessProber {
    connection: Arc<Connection>,
    interval: Duration,
}

impl LivenessProber {
    pub fn new(connection: Arc<Connection>, interval: Duration) -> Self {
        Self {
            connection,
            interval,
        }
    }

    /// Spawn the probe loop onto the current runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Probe forever. The first probe fires one interval after start.
    /// Returns at once if that first deadline is not representable.
    pub async fn run(self) {
        tracing::debug!(
            pool = %self.connection.pool(),
            interval_ms = self.interval.as_millis() as u64,
            "Liveness prober starting"
        );

        let Some(first) = Instant::now().checked_add(self.interval) else {
            tracing::warn!(
                pool = %self.connection.pool(),
                interval_secs = self.interval.as_secs(),
                "Probe interval out of range, liveness probing disabled"
            );
            return;
        };
        let mut ticker = time::interval_at(first, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.probe().await;
        }
    }

    async fn probe(&self) {
        let conn = &self.connection;
        if let Err(e) = conn.check_liveness().await {
            tracing::error!(
                pool = %conn.pool(),
                address = %conn.address(),
                failures = conn.breaker().failures(),
                error = %e,
                "Liveness probe failed"
            );
            metrics::record_breaker_failure(conn.pool());
        }
        metrics::record_connection_health(conn.pool(), !conn.breaker().is_open());
    }
}
