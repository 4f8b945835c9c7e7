//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (lookup tables reference a global lookup pool)
//! - Validate value ranges (allowance > 0, cache capacity > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SelectorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::SelectorConfig;

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no servers configured")]
    NoServers,

    #[error("server #{0} has an empty pool name")]
    EmptyPool(usize),

    #[error("pool '{0}' is configured more than once")]
    DuplicatePool(String),

    #[error("breaker.failure_allowance must be at least 1")]
    ZeroFailureAllowance,

    #[error("lookup_cache_max_items must be at least 1")]
    ZeroLookupCacheCapacity,

    #[error("max_conns_per_server must be at least 1")]
    ZeroMaxConns,

    #[error("max_idle_conns_per_server ({idle}) exceeds max_conns_per_server ({open})")]
    IdleExceedsOpen { idle: u32, open: u32 },

    #[error("lookup tables are configured but lookup_pool is empty")]
    MissingLookupPool,

    #[error("lookup_pool '{0}' must be listed in global_pools")]
    LookupPoolNotGlobal(String),

    #[error("pool '{0}' is global but has a lookup table")]
    GlobalPoolWithLookupTable(String),

    #[error("lookup table '{table}' for pool '{pool}' is not a plain identifier")]
    InvalidLookupTable { pool: String, table: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SelectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.servers.is_empty() {
        errors.push(ValidationError::NoServers);
    }

    let mut seen = HashSet::new();
    for (i, server) in config.servers.iter().enumerate() {
        if server.pool.is_empty() {
            errors.push(ValidationError::EmptyPool(i));
        } else if !seen.insert(server.pool.as_str()) {
            errors.push(ValidationError::DuplicatePool(server.pool.clone()));
        }
    }

    if config.breaker.failure_allowance == 0 {
        errors.push(ValidationError::ZeroFailureAllowance);
    }
    if config.lookup_cache_max_items == 0 {
        errors.push(ValidationError::ZeroLookupCacheCapacity);
    }
    if config.max_conns_per_server == 0 {
        errors.push(ValidationError::ZeroMaxConns);
    } else if config.max_idle_conns_per_server > config.max_conns_per_server {
        errors.push(ValidationError::IdleExceedsOpen {
            idle: config.max_idle_conns_per_server,
            open: config.max_conns_per_server,
        });
    }

    if !config.lookup_tables.is_empty() {
        if config.lookup_pool.is_empty() {
            errors.push(ValidationError::MissingLookupPool);
        } else if !config.is_global_pool(&config.lookup_pool) {
            errors.push(ValidationError::LookupPoolNotGlobal(config.lookup_pool.clone()));
        }
    }

    let mut pools: Vec<_> = config.lookup_tables.iter().collect();
    pools.sort();
    for (pool, table) in pools {
        if config.is_global_pool(pool) {
            errors.push(ValidationError::GlobalPoolWithLookupTable(pool.clone()));
        }
        if !is_identifier(table) {
            errors.push(ValidationError::InvalidLookupTable {
                pool: pool.clone(),
                table: table.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// Table names are interpolated into the lookup statement.
fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
}
