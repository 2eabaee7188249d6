//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_tv_requests_total` (counter): proxied requests by method, status
//! - `relay_tv_request_duration_seconds` (histogram): upstream latency
//! - `relay_xbox_packets_total` (counter): datagrams by kind, result
//! - `relay_xbox_operations_total` (counter): bridge calls by operation, outcome
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_tv_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "relay_tv_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("relay_tv_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_xbox_packet(kind: &'static str, ok: bool) {
    let result = if ok { "sent" } else { "failed" };
    metrics::counter!("relay_xbox_packets_total", "kind" => kind, "result" => result).increment(1);
}

pub fn record_xbox_operation(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "relay_xbox_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
