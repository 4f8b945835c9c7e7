//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Server startup:
//!     → ping attempt fails
//!     → circuit_breaker.rs (count failure, open at allowance)
//!     → backoff.rs (delay before the next attempt)
//!
//! Liveness probe failure:
//!     → circuit_breaker.rs (count failure, may open)
//! ```
//!
//! # Design Decisions
//! - Per-connection circuit breaker (not global)
//! - The only retry loop is startup connection establishment
//! - Lookup queries are never retried here; retry policy belongs to callers

pub mod backoff;
pub mod circuit_breaker;

pub use backoff::Backoff;
pub use circuit_breaker::{BreakerState, CircuitBreaker};
