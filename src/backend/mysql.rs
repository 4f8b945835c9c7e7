//! MySQL execution handles backed by `sqlx` connection pools.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Connection as _, Row};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::executor::{Connector, ShardLookupRow, SqlExecutor};
use crate::config::{PoolSettings, ServerConfig};

/// Opens lazily connected `sqlx` pools.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlConnector;

impl MySqlConnector {
    pub fn new() -> Self {
        Self
    }

    fn connect_options(server: &ServerConfig, settings: &PoolSettings) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&server.host)
            .port(server.port)
            .username(&server.user)
            .database(&server.database)
            .charset(&server.charset)
            .statement_cache_capacity(settings.statement_cache_capacity);
        if !server.pass.is_empty() {
            options = options.password(&server.pass);
        }
        options
    }

    /// Pool that never dials the server on its own. sqlx has no cap on idle
    /// connections, so idle ones are closed after `max_idle_time` instead.
    fn lazy_pool(server: &ServerConfig, settings: &PoolSettings) -> MySqlPool {
        let idle_timeout = match settings.max_idle_time_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        MySqlPoolOptions::new()
            .max_connections(settings.max_open_conns)
            .min_connections(0)
            .idle_timeout(idle_timeout)
            .acquire_timeout(settings.connect_timeout)
            // No connection is made until the first acquire.
            .connect_lazy_with(Self::connect_options(server, settings))
    }
}

impl Connector for MySqlConnector {
    fn open(
        &self,
        server: &ServerConfig,
        settings: &PoolSettings,
    ) -> Result<Arc<dyn SqlExecutor>, sqlx::Error> {
        let pool = Self::lazy_pool(server, settings);
        Ok(Arc::new(MySqlExecutor { pool }))
    }
}

/// One server's connection pool.
#[derive(Debug, Clone)]
pub struct MySqlExecutor {
    pool: MySqlPool,
}

impl MySqlExecutor {
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl SqlExecutor for MySqlExecutor {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await
    }

    async fn fetch_shard_lookup(
        &self,
        sql: &str,
        entity_id: i64,
    ) -> Result<Option<ShardLookupRow>, sqlx::Error> {
        let row = sqlx::query(sql)
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(decode_lookup_row).transpose()
    }
}

/// Typed column access, so the decode fallbacks work on any row source.
trait LookupColumns {
    fn text(&self, index: usize) -> Result<String, sqlx::Error>;
    fn signed(&self, index: usize) -> Result<i64, sqlx::Error>;
    fn unsigned(&self, index: usize) -> Result<u64, sqlx::Error>;
}

impl LookupColumns for MySqlRow {
    fn text(&self, index: usize) -> Result<String, sqlx::Error> {
        self.try_get(index)
    }

    fn signed(&self, index: usize) -> Result<i64, sqlx::Error> {
        self.try_get(index)
    }

    fn unsigned(&self, index: usize) -> Result<u64, sqlx::Error> {
        self.try_get(index)
    }
}

/// Integer column of either signedness. sqlx refuses to decode an
/// `UNSIGNED` column as `i64`. Values above `i64::MAX` saturate.
fn integer_column<R: LookupColumns>(row: &R, index: usize) -> Result<i64, sqlx::Error> {
    row.signed(index).or_else(|_| {
        row.unsigned(index)
            .map(|v| i64::try_from(v).unwrap_or(i64::MAX))
    })
}

fn decode_lookup_row<R: LookupColumns>(row: &R) -> Result<ShardLookupRow, sqlx::Error> {
    // shardId is a VARCHAR in most deployments, an INT in older ones.
    let shard_id = match row.text(0) {
        Ok(id) => id,
        Err(_) => match row.signed(0) {
            Ok(id) => id.to_string(),
            Err(_) => row.unsigned(0)?.to_string(),
        },
    };
    let shard_lock = integer_column(row, 1)?;

    Ok(ShardLookupRow {
        shard_id,
        shard_lock,
    })
}
