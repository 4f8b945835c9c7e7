//! Server selection subsystem.
//!
//! # Data Flow
//! ```text
//! pick_server(pool, table, hint)
//!     → global pool?  → registry.rs (bucket = pool)
//!     → sharded pool:
//!         hint == 0            → InvalidHintId
//!         lookup_cache.rs hit  → cached connection
//!         miss → lookup pool connection
//!              → SELECT shardId,shardLock ... WHERE entityId=hint
//!              → no row / locked → error, nothing cached
//!              → registry.rs (bucket = pool + shardId)
//!              → lookup_cache.rs set
//! ```
//!
//! # Design Decisions
//! - Registry is built once at startup and never mutated afterwards
//! - Cache keys keep the `pool:hint` format
//! - A connection whose breaker opens after startup stays servable

pub mod error;
pub mod lookup_cache;
pub mod registry;
pub mod server_selector;
pub mod status;

pub use error::{SelectorError, SelectorResult};
pub use lookup_cache::{lookup_cache_key, LookupCache};
pub use registry::ConnectionRegistry;
pub use server_selector::ServerSelector;
pub use status::{CacheStatus, ConnectionStatus, SelectorSnapshot};
