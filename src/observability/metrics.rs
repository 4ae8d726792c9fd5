//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_outcomes_total` (counter): requests by outcome status
//! - `gateway_cache_hits_total` (counter): responses served from cache
//! - `gateway_cache_entries` (gauge): cached addresses
//! - `gateway_upstream_calls_total` (counter): upstream calls by result
//! - `gateway_upstream_duration_seconds` (histogram): upstream latency
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_outcome(status: &'static str) {
    counter!("gateway_outcomes_total", "status" => status).increment(1);
}

pub fn record_cache_hit() {
    counter!("gateway_cache_hits_total").increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("gateway_cache_entries").set(entries as f64);
}

pub fn record_upstream_call(result: &'static str, started: Instant) {
    counter!("gateway_upstream_calls_total", "result" => result).increment(1);
    histogram!("gateway_upstream_duration_seconds", "result" => result)
        .record(started.elapsed().as_secs_f64());
}
