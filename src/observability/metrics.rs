//! Metrics collection and exposition.
//!
//! # Metrics
//! - `translite_translations_total` (counter): translations by outcome
//! - `translite_translation_duration_seconds` (histogram): end-to-end latency
//! - `translite_backend_attempts_total` (counter): attempts by backend, outcome
//! - `translite_backend_latency_seconds` (histogram): successful attempt/probe latency
//! - `translite_backend_enabled` (gauge): 1=eligible, 0=cooling down
//! - `translite_probes_total` (counter): probes by backend, outcome

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_translation(outcome: &'static str, duration: Duration) {
    ::metrics::counter!("translite_translations_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("translite_translation_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());
}

pub fn record_attempt(backend: &str, outcome: &'static str) {
    ::metrics::counter!(
        "translite_backend_attempts_total",
        "backend" => backend.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_backend_latency(backend: &str, latency: Duration) {
    ::metrics::histogram!("translite_backend_latency_seconds", "backend" => backend.to_string())
        .record(latency.as_secs_f64());
}

pub fn record_backend_enabled(backend: &str, enabled: bool) {
    ::metrics::gauge!("translite_backend_enabled", "backend" => backend.to_string())
        .set(if enabled { 1.0 } else { 0.0 });
}

pub fn record_probe(backend: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "failed" };
    ::metrics::counter!(
        "translite_probes_total",
        "backend" => backend.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
