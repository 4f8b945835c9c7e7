//! Execution handle abstraction.
//!
//! The selector never speaks the MySQL protocol itself. It asks a
//! [`Connector`] for one [`SqlExecutor`] per configured server and only uses
//! it to ping and to read shard lookup rows.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{PoolSettings, ServerConfig};

/// One row of a shard lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardLookupRow {
    pub shard_id: String,
    pub shard_lock: i64,
}

impl ShardLookupRow {
    pub fn new(shard_id: impl Into<String>, shard_lock: i64) -> Self {
        Self {
            shard_id: shard_id.into(),
            shard_lock,
        }
    }

    /// The entity is being migrated or is otherwise unavailable.
    pub fn is_locked(&self) -> bool {
        self.shard_lock > 0
    }
}

/// A pooled, concurrently usable handle to one database server.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Verify the server is reachable.
    async fn ping(&self) -> Result<(), sqlx::Error>;

    /// Run a `SELECT shardId,shardLock ... WHERE entityId=?` statement and
    /// return the first row, if any.
    async fn fetch_shard_lookup(
        &self,
        sql: &str,
        entity_id: i64,
    ) -> Result<Option<ShardLookupRow>, sqlx::Error>;
}

/// Opens execution handles for configured servers.
///
/// Opening must not require the server to be reachable; reachability is
/// established by [`SqlExecutor::ping`]. An error here means the server
/// parameters themselves are unusable.
pub trait Connector: Send + Sync {
    fn open(
        &self,
        server: &ServerConfig,
        settings: &PoolSettings,
    ) -> Result<Arc<dyn SqlExecutor>, sqlx::Error>;
}
