//! Connection registry.
//!
//! # Responsibilities
//! - Open and ping every configured server once, at startup
//! - Exclude servers whose breaker opened while connecting
//! - Start one liveness prober per registered connection
//! - Own every connection for the lifetime of the selector

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::backend::{Connection, Connector};
use crate::config::{SelectorConfig, ServerConfig};
use crate::health::LivenessProber;
use crate::observability::metrics;
use crate::resilience::{Backoff, CircuitBreaker};
use crate::selector::error::{SelectorError, SelectorResult};

/// Immutable map of bucket name -> connection.
pub struct ConnectionRegistry {
    connections: BTreeMap<String, Arc<Connection>>,
    probes: Vec<JoinHandle<()>>,
}

impl ConnectionRegistry {
    /// Connect every configured server.
    ///
    /// Servers that stay unreachable for `failure_allowance` attempts are left
    /// out of the registry. Only a server whose handle cannot be opened at all
    /// fails the build.
    pub async fn build(config: &SelectorConfig, connector: &dyn Connector) -> SelectorResult<Self> {
        let mut registry = Self {
            connections: BTreeMap::new(),
            probes: Vec::new(),
        };

        for server in &config.servers {
            let Some(conn) = Self::establish(config, connector, server).await? else {
                continue;
            };

            if let Some(interval) = config.max_idle_time() {
                registry
                    .probes
                    .push(LivenessProber::new(conn.clone(), interval).spawn());
            }

            tracing::info!(
                pool = %server.pool,
                address = %conn.address(),
                max_open_conns = conn.max_open_conns(),
                max_idle_conns = conn.max_idle_conns(),
                "Server registered"
            );
            metrics::record_connection_health(&server.pool, true);
            registry.connections.insert(server.pool.clone(), conn);
        }

        Ok(registry)
    }

    async fn establish(
        config: &SelectorConfig,
        connector: &dyn Connector,
        server: &ServerConfig,
    ) -> SelectorResult<Option<Arc<Connection>>> {
        let allowance = config.breaker.failure_allowance.max(1);
        let settings = config.pool_settings();
        let backoff = Backoff::from_config(&config.breaker);

        let executor = connector
            .open(server, &settings)
            .map_err(|source| SelectorError::Open {
                pool: server.pool.clone(),
                source,
            })?;
        let conn = Connection::new(
            server.pool.clone(),
            server.address(),
            executor,
            CircuitBreaker::new(allowance),
            settings,
        );

        for attempt in 0..allowance {
            let delay = backoff.delay(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::debug!(pool = %server.pool, dsn = %server.dsn(), attempt, "Connecting");
            match conn.check_liveness().await {
                Ok(()) => break,
                Err(e) => {
                    tracing::debug!(pool = %server.pool, attempt, error = %e, "Connect attempt failed");
                    metrics::record_breaker_failure(&server.pool);
                }
            }
        }

        if conn.breaker().is_open() {
            tracing::warn!(
                pool = %server.pool,
                dsn = %server.dsn(),
                failures = conn.breaker().failures(),
                "Server unreachable, excluded from registry"
            );
            metrics::record_connection_health(&server.pool, false);
            return Ok(None);
        }

        Ok(Some(Arc::new(conn)))
    }

    pub fn get(&self, bucket: &str) -> Option<Arc<Connection>> {
        self.connections.get(bucket).cloned()
    }

    /// All connections, ordered by bucket name.
    pub fn all(&self) -> Vec<Arc<Connection>> {
        self.connections.values().cloned().collect()
    }

    /// Connections whose bucket name starts with `prefix`.
    pub fn with_prefix(&self, prefix: &str) -> Vec<Arc<Connection>> {
        self.connections
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(bucket, _)| bucket.starts_with(prefix))
            .map(|(_, conn)| conn.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Drop for ConnectionRegistry {
    fn drop(&mut self) {
        for probe in &self.probes {
            probe.abort();
        }
    }
}
