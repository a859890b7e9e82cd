//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "playcoach_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "playcoach_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "playcoach_http_requests_in_flight";

    // Pipeline metrics
    pub const ANALYSES_COMPLETED_TOTAL: &str = "playcoach_analyses_completed_total";
    pub const ANALYSES_FAILED_TOTAL: &str = "playcoach_analyses_failed_total";
    pub const ACTIVATION_WAIT_SECONDS: &str = "playcoach_activation_wait_seconds";
    pub const ANALYSIS_DURATION_SECONDS: &str = "playcoach_analysis_duration_seconds";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a completed analysis and its end-to-end duration.
pub fn record_analysis_completed(duration_secs: f64) {
    counter!(names::ANALYSES_COMPLETED_TOTAL).increment(1);
    histogram!(names::ANALYSIS_DURATION_SECONDS).record(duration_secs);
}

/// Record an analysis that failed while attempting `stage`.
pub fn record_analysis_failed(stage: &str) {
    let labels = [("stage", stage.to_string())];
    counter!(names::ANALYSES_FAILED_TOTAL, &labels).increment(1);
}

/// Record how long an uploaded file took to become ACTIVE.
pub fn record_activation_wait(duration_secs: f64) {
    histogram!(names::ACTIVATION_WAIT_SECONDS).record(duration_secs);
}

/// Collapse per-video paths into one label value.
fn sanitize_path(path: &str) -> String {
    match path.strip_prefix("/analyses/") {
        Some(rest) if !rest.is_empty() => "/analyses/:name".to_string(),
        _ => path.to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/analyses/video_1700000000000.mp4"), "/analyses/:name");
        assert_eq!(sanitize_path("/"), "/");
        assert_eq!(sanitize_path("/analyses/"), "/analyses/");
        assert_eq!(sanitize_path("/health"), "/health");
    }
}
