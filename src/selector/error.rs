//! Selector error definitions.

use thiserror::Error;

/// Errors returned by server selection.
#[derive(Debug, Error)]
pub enum SelectorError {
    /// No registered connection for the pool or computed bucket.
    #[error("server not found: {0}")]
    ServerNotFound(String),

    /// A sharded pool was addressed with hint 0.
    #[error("invalid hint id 0 for sharded pool {0}")]
    InvalidHintId(String),

    /// The sharded pool has no lookup table configured.
    #[error("lookup table not found for pool {0}")]
    LookupTableNotFound(String),

    /// The lookup table has no row for the hint.
    #[error("shard lookup not found for {pool}:{hint_id}")]
    ShardLookupNotFound { pool: String, hint_id: i64 },

    /// The lookup row has its shard lock set.
    #[error("entity {pool}:{hint_id} is locked")]
    EntityLocked { pool: String, hint_id: i64 },

    /// Lookup query failed in the execution layer.
    #[error("query error: {0}")]
    Query(#[from] sqlx::Error),

    /// A server handle could not be opened at startup.
    #[error("cannot open server for pool {pool}: {source}")]
    Open {
        pool: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Result type for selector operations.
pub type SelectorResult<T> = Result<T, SelectorError>;
