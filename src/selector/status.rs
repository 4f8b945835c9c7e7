//! Typed status snapshot for admin and diagnostics output.

use serde::Serialize;

use crate::backend::Connection;

/// State of one registered connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub pool: String,
    pub address: String,
    pub breaker_open: bool,
    pub failures: u32,
    pub max_idle_conns: u32,
    pub max_open_conns: u32,
    pub max_idle_time_ms: u64,
}

impl From<&Connection> for ConnectionStatus {
    fn from(conn: &Connection) -> Self {
        Self {
            pool: conn.pool().to_string(),
            address: conn.address().to_string(),
            breaker_open: conn.breaker().is_open(),
            failures: conn.breaker().failures(),
            max_idle_conns: conn.max_idle_conns(),
            max_open_conns: conn.max_open_conns(),
            max_idle_time_ms: conn.max_idle_time_ms(),
        }
    }
}

/// Lookup cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub len: usize,
    pub capacity: usize,
}

/// Point-in-time view of a selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorSnapshot {
    /// Registered connections, ordered by pool.
    pub connections: Vec<ConnectionStatus>,
    pub lookup_cache: CacheStatus,
}
