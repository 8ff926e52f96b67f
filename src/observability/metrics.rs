//! Metrics collection and exposition.
//!
//! # Metrics
//! - `procmux_requests_total` (counter): dispatched requests by route, outcome
//! - `procmux_spawn_duration_seconds` (histogram): process lifetime per route
//! - `procmux_active_handlers` (gauge): handlers currently registered
//! - `procmux_routes` (gauge): routes in the table
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed (tests need none)
//! - Labels are route ids, never handler ids (unbounded cardinality)
//! - The active-handler gauge moves by one per actual insert or removal,
//!   never by re-reading the registry size

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter, serving scrapes on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a dispatched request.
pub fn record_request(route_id: &str, outcome: &'static str) {
    metrics::counter!(
        "procmux_requests_total",
        "route" => route_id.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record how long a spawned process ran.
pub fn record_spawn_duration(route_id: &str, started: Instant) {
    metrics::histogram!(
        "procmux_spawn_duration_seconds",
        "route" => route_id.to_string()
    )
    .record(started.elapsed().as_secs_f64());
}

/// A handler became reachable through the registry.
pub fn record_handler_registered() {
    metrics::gauge!("procmux_active_handlers").increment(1.0);
}

/// A handler stopped being reachable through the registry.
pub fn record_handler_deregistered() {
    metrics::gauge!("procmux_active_handlers").decrement(1.0);
}

/// Number of routes in the table.
pub fn record_route_count(count: usize) {
    metrics::gauge!("procmux_routes").set(count as f64);
}
