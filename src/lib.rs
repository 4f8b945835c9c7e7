//! Shard-aware MySQL server selection.
//!
//! Routes `(pool, table, hint)` requests to one of many physical MySQL
//! connections. Global pools map to a single server; sharded pools resolve
//! the owning shard through a lookup table, cached in a bounded LRU. Each
//! connection carries a circuit breaker fed by startup pings and periodic
//! liveness probes.

pub mod backend;
pub mod config;
pub mod health;
pub mod observability;
pub mod resilience;
pub mod selector;

pub use backend::{Connection, Connector, MySqlConnector, ShardLookupRow, SqlExecutor};
pub use config::SelectorConfig;
pub use selector::{SelectorError, SelectorResult, SelectorSnapshot, ServerSelector};
