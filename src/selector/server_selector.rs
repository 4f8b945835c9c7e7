//! Shard-aware server selection.
//!
//! # Responsibilities
//! - Classify pools as global (non-sharded) or sharded
//! - Resolve sharded requests through the lookup table and lookup cache
//! - Hand out shared references to registered connections
//!
//! # Design Decisions
//! - Read-only with respect to the lookup database
//! - No internal retries; a failed lookup is returned to the caller
//! - Locked or unresolvable entities are never cached

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::backend::{Connection, Connector};
use crate::config::SelectorConfig;
use crate::observability::metrics;
use crate::selector::error::{SelectorError, SelectorResult};
use crate::selector::lookup_cache::{lookup_cache_key, LookupCache};
use crate::selector::registry::ConnectionRegistry;
use crate::selector::status::{CacheStatus, ConnectionStatus, SelectorSnapshot};

/// Routes `(pool, table, hint)` requests to registered connections.
///
/// Built once from configuration and shared (e.g. behind an `Arc`) by all
/// request handlers. Every method is safe to call concurrently.
pub struct ServerSelector {
    global_pools: BTreeSet<String>,
    lookup_pool: String,
    /// Sharded pool -> lookup statement.
    lookup_sql: HashMap<String, String>,
    registry: ConnectionRegistry,
    lookup_cache: LookupCache<Arc<Connection>>,
}

impl ServerSelector {
    /// Connect all configured servers and build the selector.
    pub async fn new(config: &SelectorConfig, connector: &dyn Connector) -> SelectorResult<Self> {
        let registry = ConnectionRegistry::build(config, connector).await?;

        let lookup_sql = config
            .lookup_tables
            .keys()
            .filter_map(|pool| {
                config
                    .lookup_table(pool)
                    .map(|table| (pool.clone(), lookup_statement(table)))
            })
            .collect();

        tracing::info!(
            servers = config.servers.len(),
            registered = registry.len(),
            lookup_pool = %config.lookup_pool,
            "Server selector ready"
        );

        Ok(Self {
            global_pools: config.global_pools.clone(),
            lookup_pool: config.lookup_pool.clone(),
            lookup_sql,
            registry,
            lookup_cache: LookupCache::new(config.lookup_cache_max_items),
        })
    }

    /// Pick the connection serving `hint_id` in `pool`.
    ///
    /// `table` does not influence routing; it is accepted so callers can pass
    /// their full request context.
    pub async fn pick_server(
        &self,
        pool: &str,
        table: &str,
        hint_id: i64,
    ) -> SelectorResult<Arc<Connection>> {
        if self.is_sharded_pool(pool) {
            return self.pick_sharded_server(pool, table, hint_id).await;
        }

        self.pick_non_sharded_server(pool)
    }

    /// Registered connection for an exact bucket name.
    pub fn server_by_bucket(&self, bucket: &str) -> SelectorResult<Arc<Connection>> {
        self.registry
            .get(bucket)
            .ok_or_else(|| SelectorError::ServerNotFound(bucket.to_string()))
    }

    /// Every registered connection.
    pub fn servers(&self) -> Vec<Arc<Connection>> {
        self.registry.all()
    }

    /// Connections whose bucket starts with `pool` (`UserShard` matches
    /// `UserShard1`, `UserShard2`, ...).
    pub fn pool_servers(&self, pool: &str) -> Vec<Arc<Connection>> {
        self.registry.with_prefix(pool)
    }

    /// Drop the cached shard mapping of `hint_id` in `pool`.
    ///
    /// Called by writers that move an entity to another shard. A no-op for
    /// hint 0 and for pools that are not routed through a lookup table.
    pub fn kick_lookup_cache(&self, pool: &str, hint_id: i64) {
        if hint_id == 0 || !self.lookup_sql.contains_key(pool) {
            return;
        }

        let key = lookup_cache_key(pool, hint_id);
        self.lookup_cache.del(&key);
        metrics::record_lookup_cache_size(self.lookup_cache.len());
        tracing::trace!(key = %key, "Lookup cache kicked");
    }

    pub fn is_sharded_pool(&self, pool: &str) -> bool {
        !self.global_pools.contains(pool)
    }

    pub fn lookup_cache(&self) -> &LookupCache<Arc<Connection>> {
        &self.lookup_cache
    }

    pub fn snapshot(&self) -> SelectorSnapshot {
        SelectorSnapshot {
            connections: self
                .registry
                .all()
                .iter()
                .map(|conn| ConnectionStatus::from(conn.as_ref()))
                .collect(),
            lookup_cache: CacheStatus {
                len: self.lookup_cache.len(),
                capacity: self.lookup_cache.capacity(),
            },
        }
    }

    fn pick_non_sharded_server(&self, pool: &str) -> SelectorResult<Arc<Connection>> {
        self.server_by_bucket(pool)
    }

    async fn pick_sharded_server(
        &self,
        pool: &str,
        table: &str,
        hint_id: i64,
    ) -> SelectorResult<Arc<Connection>> {
        if hint_id == 0 {
            return Err(SelectorError::InvalidHintId(pool.to_string()));
        }

        let key = lookup_cache_key(pool, hint_id);
        if let Some(conn) = self.lookup_cache.get(&key) {
            metrics::record_lookup_cache(true);
            return Ok(conn);
        }
        metrics::record_lookup_cache(false);

        let lookup = self.server_by_bucket(&self.lookup_pool)?;
        let sql = self
            .lookup_sql
            .get(pool)
            .ok_or_else(|| SelectorError::LookupTableNotFound(pool.to_string()))?;

        let row = match lookup.executor().fetch_shard_lookup(sql, hint_id).await {
            Ok(row) => row,
            Err(e) => {
                tracing::error!(sql = %sql, hint_id, table = %table, error = %e, "Shard lookup failed");
                metrics::record_lookup_query("error");
                return Err(e.into());
            }
        };

        let Some(row) = row else {
            metrics::record_lookup_query("not_found");
            return Err(SelectorError::ShardLookupNotFound {
                pool: pool.to_string(),
                hint_id,
            });
        };
        if row.is_locked() {
            metrics::record_lookup_query("locked");
            return Err(SelectorError::EntityLocked {
                pool: pool.to_string(),
                hint_id,
            });
        }
        metrics::record_lookup_query("found");

        let bucket = format!("{}{}", pool, row.shard_id);
        let conn = self.server_by_bucket(&bucket)?;

        self.lookup_cache.set(key.clone(), conn.clone());
        metrics::record_lookup_cache_size(self.lookup_cache.len());
        tracing::debug!(key = %key, bucket = %bucket, "Lookup cache set");

        Ok(conn)
    }
}

fn lookup_statement(table: &str) -> String {
    format!("SELECT shardId,shardLock FROM {} WHERE entityId=?", table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_statement() {
        assert_eq!(
            lookup_statement("UserLookup"),
            "SELECT shardId,shardLock FROM UserLookup WHERE entityId=?"
        );
    }
}
