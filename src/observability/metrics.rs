//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by method and status
//! - `router_request_duration_seconds` (histogram): latency distribution
//! - `router_resolution_failures_total` (counter): failed resolutions by kind
//! - `router_config_reloads_total` (counter): reloads by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!("router_requests_total", "method" => method.to_string(), "status" => status.clone())
        .increment(1);
    metrics::histogram!("router_request_duration_seconds", "method" => method.to_string(), "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_resolution_failure(kind: &'static str) {
    metrics::counter!("router_resolution_failures_total", "kind" => kind).increment(1);
}

pub fn record_config_reload(outcome: &'static str) {
    metrics::counter!("router_config_reloads_total", "outcome" => outcome).increment(1);
}
