//! Registered server connection.
//!
//! # Responsibilities
//! - Represent a single physical server for one pool or shard bucket
//! - Own the server's execution handle and circuit breaker
//! - Carry the idle/open caps applied to the handle

use std::fmt;
use std::sync::Arc;

use crate::backend::executor::SqlExecutor;
use crate::config::PoolSettings;
use crate::resilience::CircuitBreaker;

/// A single server connection, shared by reference across requests.
pub struct Connection {
    /// Registry key (e.g. `Config`, `UserShard2`).
    pool: String,
    /// `host:port`, for diagnostics.
    address: String,
    executor: Arc<dyn SqlExecutor>,
    breaker: CircuitBreaker,
    settings: PoolSettings,
}

impl Connection {
    pub fn new(
        pool: impl Into<String>,
        address: impl Into<String>,
        executor: Arc<dyn SqlExecutor>,
        breaker: CircuitBreaker,
        settings: PoolSettings,
    ) -> Self {
        Self {
            pool: pool.into(),
            address: address.into(),
            executor,
            breaker,
            settings,
        }
    }

    pub fn pool(&self) -> &str {
        &self.pool
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// The underlying handle; safe for concurrent queries.
    pub fn executor(&self) -> &Arc<dyn SqlExecutor> {
        &self.executor
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn max_idle_conns(&self) -> u32 {
        self.settings.max_idle_conns
    }

    pub fn max_open_conns(&self) -> u32 {
        self.settings.max_open_conns
    }

    pub fn max_idle_time_ms(&self) -> u64 {
        self.settings.max_idle_time_ms
    }

    /// Ping the server and feed the outcome into the breaker.
    pub async fn check_liveness(&self) -> Result<(), sqlx::Error> {
        match self.executor.ping().await {
            Ok(()) => {
                self.breaker.record_success();
                Ok(())
            }
            Err(e) => {
                if self.breaker.record_failure() {
                    tracing::warn!(
                        pool = %self.pool,
                        address = %self.address,
                        failures = self.breaker.failures(),
                        "Circuit breaker opened"
                    );
                }
                Err(e)
            }
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("pool", &self.pool)
            .field("address", &self.address)
            .field("breaker", &self.breaker)
            .field("settings", &self.settings)
            .finish()
    }
}
