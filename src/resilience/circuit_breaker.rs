//! Circuit breaker for server connections.
//!
//! # States
//! - Closed: connection eligible for use
//! - Open: connection assumed unreachable
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= failure_allowance
//! ```
//!
//! There is no half-open state. A connection whose breaker is open when the
//! registry is built is left out of it until the process restarts. Failures
//! recorded by the liveness prober after registration may open the breaker
//! but do not take the connection out of service.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
}

/// Per-connection failure counter with an open/closed gate.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_allowance: u32,
    /// Consecutive failure count.
    failures: AtomicU32,
    open: AtomicBool,
}

impl CircuitBreaker {
    pub fn new(failure_allowance: u32) -> Self {
        Self {
            failure_allowance,
            failures: AtomicU32::new(0),
            open: AtomicBool::new(false),
        }
    }

    pub fn failure_allowance(&self) -> u32 {
        self.failure_allowance
    }

    /// Current consecutive failure count.
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> BreakerState {
        if self.open.load(Ordering::Acquire) {
            BreakerState::Open
        } else {
            BreakerState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == BreakerState::Open
    }

    /// Record a failed attempt.
    ///
    /// Returns true if this failure tripped the breaker.
    pub fn record_failure(&self) -> bool {
        let failures = self.failures.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        if failures >= self.failure_allowance {
            // Only the caller that flips the flag reports the transition.
            return !self.open.swap(true, Ordering::AcqRel);
        }
        false
    }

    /// Record a successful attempt.
    ///
    /// Resets the consecutive failure count while closed. An open breaker
    /// stays open.
    pub fn record_success(&self) {
        if !self.is_open() {
            self.failures.store(0, Ordering::Relaxed);
        }
    }
}
