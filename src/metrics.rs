//! Prometheus metrics for upstream forwarding.
//!
//! The health endpoint is not instrumented.

use std::time::Instant;

use axum::routing::get;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::api::BaseApplication;
use crate::error::{RouteError, WrapperError};

/// Path the Prometheus text exposition is served on.
pub const METRICS_PATH: &str = "/metrics";

// === Metric Name Constants ===

/// Upstream request latency metric name.
pub const METRIC_UPSTREAM_LATENCY: &str = "upstream_request_latency_ms";
/// Forwarded requests counter metric name.
pub const METRIC_UPSTREAM_REQUESTS: &str = "upstream_requests_total";
/// Failed forwards counter metric name.
pub const METRIC_UPSTREAM_FAILURES: &str = "upstream_failures_total";

/// Install the global Prometheus recorder and describe all metrics.
///
/// Call this once at startup. The returned handle renders the text
/// exposition for the `/metrics` route.
pub fn init_metrics() -> Result<PrometheusHandle, WrapperError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| WrapperError::Metrics(e.to_string()))?;

    describe_histogram!(
        METRIC_UPSTREAM_LATENCY,
        "Upstream Nominatim request latency in milliseconds"
    );
    describe_counter!(
        METRIC_UPSTREAM_REQUESTS,
        "Total number of requests forwarded to Nominatim"
    );
    describe_counter!(
        METRIC_UPSTREAM_FAILURES,
        "Total number of forwards that failed before a response arrived"
    );

    debug!("Metrics initialized");
    Ok(handle)
}

/// Serve `handle`'s exposition on [`METRICS_PATH`].
///
/// Goes through the same registration as every other route, so a base
/// application that already owns `/metrics` fails with a duplicate error.
pub fn register_route<B: BaseApplication>(
    app: &mut B,
    handle: PrometheusHandle,
) -> Result<(), RouteError> {
    app.register_route(
        METRICS_PATH,
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    )
}

/// Record upstream request latency.
pub fn record_upstream_latency(start: Instant, endpoint: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_UPSTREAM_LATENCY, "endpoint" => endpoint.to_string()).record(latency_ms);
}

/// Increment forwarded requests counter.
pub fn inc_upstream_requests(endpoint: &str) {
    counter!(METRIC_UPSTREAM_REQUESTS, "endpoint" => endpoint.to_string()).increment(1);
}

/// Increment failed forwards counter.
pub fn inc_upstream_failures(endpoint: &str) {
    counter!(METRIC_UPSTREAM_FAILURES, "endpoint" => endpoint.to_string()).increment(1);
}
