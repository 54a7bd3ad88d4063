//! Metrics collection and export for Waymark.
//!
//! Uses the `metrics` crate for instrumentation and exports
//! to Prometheus format.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;
use tracing::info;

/// Metric names.
pub mod names {
    pub const REQUESTS_TOTAL: &str = "waymark_requests_total";
    pub const MATCHES_TOTAL: &str = "waymark_matches_total";
    pub const UNMATCHED_TOTAL: &str = "waymark_unmatched_total";
    pub const METHOD_NOT_ALLOWED_TOTAL: &str = "waymark_method_not_allowed_total";
    pub const ROUTES_REGISTERED: &str = "waymark_routes_registered";
    pub const MATCH_LATENCY_SECONDS: &str = "waymark_match_latency_seconds";
}

/// Initialize the metrics system.
pub fn init_metrics() {
    metrics::describe_counter!(
        names::REQUESTS_TOTAL,
        "Total number of requests dispatched"
    );
    metrics::describe_counter!(
        names::MATCHES_TOTAL,
        "Requests that matched a route, by route name"
    );
    metrics::describe_counter!(
        names::UNMATCHED_TOTAL,
        "Requests whose path matched no route"
    );
    metrics::describe_counter!(
        names::METHOD_NOT_ALLOWED_TOTAL,
        "Requests that matched a route with a disallowed method"
    );
    metrics::describe_gauge!(names::ROUTES_REGISTERED, "Number of registered routes");
    metrics::describe_histogram!(
        names::MATCH_LATENCY_SECONDS,
        "Path lookup latency in seconds"
    );

    info!("Metrics initialized");
}

/// Start the Prometheus metrics server.
///
/// # Errors
///
/// Returns an error if the server cannot be started.
pub fn start_metrics_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    info!("Metrics server listening on {}", addr);
    Ok(())
}

/// Record a request that matched `route`.
pub fn record_match(route: &str) {
    counter!(names::MATCHES_TOTAL, "route" => route.to_string()).increment(1);
}

/// Record a request that matched nothing.
pub fn record_unmatched() {
    counter!(names::UNMATCHED_TOTAL).increment(1);
}

/// Record a request rejected by the route's method list.
pub fn record_method_not_allowed(route: &str) {
    counter!(names::METHOD_NOT_ALLOWED_TOTAL, "route" => route.to_string()).increment(1);
}

/// Update the registered route count.
pub fn set_routes_registered(count: usize) {
    gauge!(names::ROUTES_REGISTERED).set(count as f64);
}

/// Guard that counts a request and records lookup latency on drop.
pub struct RequestMetricsGuard {
    started: Instant,
}

impl RequestMetricsGuard {
    /// Start timing a request.
    #[must_use]
    pub fn new() -> Self {
        counter!(names::REQUESTS_TOTAL).increment(1);
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for RequestMetricsGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RequestMetricsGuard {
    fn drop(&mut self) {
        histogram!(names::MATCH_LATENCY_SECONDS).record(self.started.elapsed().as_secs_f64());
    }
}
