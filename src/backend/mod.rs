//! Backend connection subsystem.
//!
//! # Data Flow
//! ```text
//! ServerConfig (one per pool / shard bucket)
//!     → executor.rs (Connector opens a SqlExecutor handle)
//!     → mysql.rs (sqlx pool, lazily connected)
//!     → connection.rs (handle + circuit breaker + caps)
//!     → registered by the selector, shared via Arc
//! ```
//!
//! # Design Decisions
//! - One handle per server; the handle pools sub-connections internally
//! - Opening never touches the network; pinging does
//! - The execution layer is a trait so the selector is testable without MySQL

pub mod connection;
pub mod executor;
pub mod mysql;

pub use connection::Connection;
pub use executor::{Connector, ShardLookupRow, SqlExecutor};
pub use mysql::{MySqlConnector, MySqlExecutor};
