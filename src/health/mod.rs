//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active liveness probes (active.rs):
//!     Periodic timer (max_idle_time), one task per connection
//!     → Ping the connection
//!     → Record failure/success in its circuit breaker
//! ```
//!
//! # Design Decisions
//! - Probes run for the lifetime of the selector; there is no cancellation
//!   token, dropping the selector aborts them
//! - A probe failure never removes a connection from the registry
//! - Health state is per-connection, not per-pool

pub mod active;

pub use active::LivenessProber;
