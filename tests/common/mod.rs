//! Shared utilities for selector integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use shard_selector::config::{PoolSettings, SelectorConfig, ServerConfig};
use shard_selector::{Connector, ShardLookupRow, SqlExecutor};

/// In-memory stand-in for one MySQL server.
#[derive(Default)]
pub struct MockBackend {
    pub ping_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    /// Upcoming pings that fail before pings succeed again.
    failing_pings: AtomicU32,
    down: AtomicBool,
    query_error: AtomicBool,
    rows: Mutex<HashMap<i64, ShardLookupRow>>,
    last_sql: Mutex<Option<String>>,
}

impl MockBackend {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn fail_next_pings(&self, n: u32) {
        self.failing_pings.store(n, Ordering::SeqCst);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.query_error.store(fail, Ordering::SeqCst);
    }

    pub fn insert_row(&self, entity_id: i64, shard_id: &str, shard_lock: i64) {
        self.rows
            .lock()
            .unwrap()
            .insert(entity_id, ShardLookupRow::new(shard_id, shard_lock));
    }

    pub fn pings(&self) -> usize {
        self.ping_calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn last_sql(&self) -> Option<String> {
        self.last_sql.lock().unwrap().clone()
    }
}

#[async_trait]
impl SqlExecutor for MockBackend {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let failing = self
            .failing_pings
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }

    async fn fetch_shard_lookup(
        &self,
        sql: &str,
        entity_id: i64,
    ) -> Result<Option<ShardLookupRow>, sqlx::Error> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_sql.lock().unwrap() = Some(sql.to_string());
        if self.query_error.load(Ordering::SeqCst) {
            return Err(sqlx::Error::Protocol("lookup database gone".into()));
        }
        Ok(self.rows.lock().unwrap().get(&entity_id).cloned())
    }
}

/// Connector handing out one shared [`MockBackend`] per pool.
#[derive(Default)]
pub struct MockConnector {
    backends: Mutex<HashMap<String, Arc<MockBackend>>>,
    unopenable: Mutex<HashSet<String>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backend for `pool`, created on first use.
    pub fn backend(&self, pool: &str) -> Arc<MockBackend> {
        self.backends
            .lock()
            .unwrap()
            .entry(pool.to_string())
            .or_default()
            .clone()
    }

    pub fn reject_open(&self, pool: &str) {
        self.unopenable.lock().unwrap().insert(pool.to_string());
    }
}

impl Connector for MockConnector {
    fn open(
        &self,
        server: &ServerConfig,
        _settings: &PoolSettings,
    ) -> Result<Arc<dyn SqlExecutor>, sqlx::Error> {
        if self.unopenable.lock().unwrap().contains(&server.pool) {
            return Err(sqlx::Error::Configuration("bad server parameters".into()));
        }
        Ok(self.backend(&server.pool))
    }
}

pub fn server(pool: &str) -> ServerConfig {
    ServerConfig {
        pool: pool.to_string(),
        host: "127.0.0.1".to_string(),
        port: 3306,
        user: "app".to_string(),
        pass: String::new(),
        database: pool.to_lowercase(),
        charset: "utf8mb4".to_string(),
    }
}

/// Global `Config` and `ShardLookup` pools plus two `UserShard` shards routed
/// through `UserLookup`. Probing and startup backoff are disabled.
pub fn sharded_config() -> SelectorConfig {
    let mut config = SelectorConfig::default();
    config.servers = vec![
        server("Config"),
        server("ShardLookup"),
        server("UserShard1"),
        server("UserShard2"),
    ];
    config.global_pools.insert("Config".to_string());
    config.global_pools.insert("ShardLookup".to_string());
    config.lookup_pool = "ShardLookup".to_string();
    config
        .lookup_tables
        .insert("UserShard".to_string(), "UserLookup".to_string());
    config.breaker.failure_allowance = 3;
    config.breaker.retry_backoff_ms = 0;
    config.max_idle_time_ms = 0;
    config
}
