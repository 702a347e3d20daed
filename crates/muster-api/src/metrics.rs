//! Metrics middleware and instrumentation for the Muster API.
//!
//! Provides Prometheus-rendered metrics for request duration and
//! throughput; the notification and ledger counters are emitted by the
//! domain crates and picked up by the same recorder.

use std::sync::OnceLock;
use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// API request duration histogram.
pub const API_REQUEST_DURATION: &str = "api_request_duration_seconds";

/// API request counter.
pub const API_REQUEST_TOTAL: &str = "api_request_total";

const UNMATCHED_ENDPOINT: &str = "unmatched";

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initializes the global metrics recorder with a Prometheus exporter.
///
/// Safe to call multiple times; subsequent calls are no-ops.
///
/// # Panics
///
/// Panics if the recorder cannot be installed. Metrics are critical
/// infrastructure; the server does not start without them.
#[allow(clippy::panic)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .unwrap_or_else(|e| panic!("failed to install prometheus recorder: {e}"))
        })
        .clone()
}

/// Renders the current metrics in Prometheus text format.
///
/// Returns an empty string when the recorder was never initialized
/// (router-level tests).
#[must_use]
pub fn render() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Axum middleware recording per-request duration and counts.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| UNMATCHED_ENDPOINT.to_string(), |p| p.as_str().to_string());
    let method = request.method().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    histogram!(
        API_REQUEST_DURATION,
        "method" => method.clone(),
        "endpoint" => endpoint.clone(),
        "status" => status.clone()
    )
    .record(start.elapsed().as_secs_f64());
    counter!(
        API_REQUEST_TOTAL,
        "method" => method,
        "endpoint" => endpoint,
        "status" => status
    )
    .increment(1);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_without_recorder_is_empty() {
        // The recorder may or may not be installed depending on test
        // ordering; render must never panic either way.
        let _ = render();
    }
}
