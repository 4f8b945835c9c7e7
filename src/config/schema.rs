//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the selector.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

/// Root configuration for the server selector.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Physical MySQL servers, one per pool or shard bucket.
    pub servers: Vec<ServerConfig>,

    /// Pools served by a single non-sharded server.
    pub global_pools: BTreeSet<String>,

    /// Non-sharded pool holding the entity -> shard lookup tables.
    pub lookup_pool: String,

    /// Sharded pool name -> lookup table name.
    pub lookup_tables: HashMap<String, String>,

    /// Circuit breaker settings.
    pub breaker: BreakerConfig,

    /// Idle connections kept per server.
    pub max_idle_conns_per_server: u32,

    /// Open connections allowed per server.
    pub max_conns_per_server: u32,

    /// Liveness probe interval in milliseconds (0 disables probing).
    pub max_idle_time_ms: u64,

    /// Timeout for acquiring a connection from a server's pool, in seconds.
    pub connect_timeout_secs: u64,

    /// Capacity of the (pool, hint) -> connection cache.
    pub lookup_cache_max_items: usize,

    /// Prepared statements cached per physical connection.
    pub cache_prepare_stmt_max_items: usize,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            global_pools: BTreeSet::new(),
            lookup_pool: String::new(),
            lookup_tables: HashMap::new(),
            breaker: BreakerConfig::default(),
            max_idle_conns_per_server: 2,
            max_conns_per_server: 20,
            max_idle_time_ms: 60_000,
            connect_timeout_secs: 5,
            lookup_cache_max_items: 1 << 20,
            cache_prepare_stmt_max_items: 1000,
            observability: ObservabilityConfig::default(),
        }
    }
}

impl SelectorConfig {
    /// Whether `pool` is routed directly, without a shard lookup.
    pub fn is_global_pool(&self, pool: &str) -> bool {
        self.global_pools.contains(pool)
    }

    /// Lookup table configured for a sharded pool.
    pub fn lookup_table(&self, pool: &str) -> Option<&str> {
        self.lookup_tables
            .get(pool)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    /// Probe interval, or `None` when probing is disabled.
    pub fn max_idle_time(&self) -> Option<Duration> {
        (self.max_idle_time_ms > 0).then(|| Duration::from_millis(self.max_idle_time_ms))
    }

    /// Per-server pool settings handed to the connector.
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_idle_conns: self.max_idle_conns_per_server,
            max_open_conns: self.max_conns_per_server,
            max_idle_time_ms: self.max_idle_time_ms,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            statement_cache_capacity: self.cache_prepare_stmt_max_items,
        }
    }
}

/// A single MySQL server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Registry key: a global pool name, or a sharded pool name followed by
    /// its shard id (e.g. `UserShard2`).
    pub pool: String,

    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub user: String,

    #[serde(default)]
    pub pass: String,

    pub database: String,

    #[serde(default = "default_charset")]
    pub charset: String,
}

fn default_port() -> u16 {
    3306
}

fn default_charset() -> String {
    "utf8mb4".to_string()
}

impl ServerConfig {
    /// `host:port` of the server.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connection description safe for logs (no password).
    pub fn dsn(&self) -> String {
        format!(
            "{}@tcp({})/{}?charset={}",
            self.user,
            self.address(),
            self.database,
            self.charset
        )
    }
}

/// Pool limits applied to each server handle when it is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_idle_conns: u32,
    pub max_open_conns: u32,
    pub max_idle_time_ms: u64,
    pub connect_timeout: Duration,
    pub statement_cache_capacity: usize,
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures tolerated before the breaker opens.
    pub failure_allowance: u32,

    /// Base delay between startup connection attempts in milliseconds.
    pub retry_backoff_ms: u64,

    /// Maximum delay between startup connection attempts in milliseconds.
    pub retry_backoff_max_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_allowance: 5,
            retry_backoff_ms: 100,
            retry_backoff_max_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub log_json: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
