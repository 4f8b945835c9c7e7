//! Metrics collection and exposition.
//!
//! # Metrics
//! - `selector_lookup_cache_total` (counter): cache lookups by `result` (hit/miss)
//! - `selector_lookup_cache_size` (gauge): entries in the lookup cache
//! - `selector_lookup_queries_total` (counter): lookup-table queries by `outcome`
//! - `selector_breaker_failures_total` (counter): recorded failures by `pool`
//! - `selector_connection_health` (gauge): 1=closed, 0=open, by `pool`
//!
//! Recording is a no-op until a recorder is installed.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter with an HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_lookup_cache(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("selector_lookup_cache_total", "result" => result).increment(1);
}

pub fn record_lookup_cache_size(len: usize) {
    gauge!("selector_lookup_cache_size").set(len as f64);
}

/// `outcome` is one of `found`, `not_found`, `locked`, `error`.
pub fn record_lookup_query(outcome: &'static str) {
    counter!("selector_lookup_queries_total", "outcome" => outcome).increment(1);
}

pub fn record_breaker_failure(pool: &str) {
    counter!("selector_breaker_failures_total", "pool" => pool.to_string()).increment(1);
}

pub fn record_connection_health(pool: &str, closed: bool) {
    gauge!("selector_connection_health", "pool" => pool.to_string())
        .set(if closed { 1.0 } else { 0.0 });
}
