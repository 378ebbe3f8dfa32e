//! # Prometheus Metrics
//!
//! Request metrics recorded through the `metrics` facade and exported in
//! Prometheus text format by `metrics-exporter-prometheus`.
//!
//! | Metric                               | Kind      | Labels                   |
//! |--------------------------------------|-----------|--------------------------|
//! | `prr_http_requests_total`            | counter   | `method`, `path`, `status` |
//! | `prr_http_errors_total`              | counter   | `method`, `path`, `status` |
//! | `prr_http_request_duration_seconds`  | histogram | `method`, `path`         |
//! | `prr_pull_requests_created_total`    | counter   |                          |
//! | `prr_pull_requests_merged_total`     | counter   |                          |
//!
//! `path` is the matched route template, never the raw URI, so label
//! cardinality stays bounded. Without an installed recorder every call is a
//! no-op.

use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

pub const REQUESTS_TOTAL: &str = "prr_http_requests_total";
pub const ERRORS_TOTAL: &str = "prr_http_errors_total";
pub const REQUEST_DURATION: &str = "prr_http_request_duration_seconds";
pub const PULL_REQUESTS_CREATED: &str = "prr_pull_requests_created_total";
pub const PULL_REQUESTS_MERGED: &str = "prr_pull_requests_merged_total";

const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Exporter builder with the latency buckets applied.
pub fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), DURATION_BUCKETS)
}

/// Install the process-wide recorder. Fails if one is already installed.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    let handle = builder()?.install_recorder()?;
    describe();
    Ok(handle)
}

fn describe() {
    metrics::describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests.");
    metrics::describe_counter!(ERRORS_TOTAL, "HTTP responses with a 4xx or 5xx status.");
    metrics::describe_histogram!(
        REQUEST_DURATION,
        metrics::Unit::Seconds,
        "HTTP request latency."
    );
    metrics::describe_counter!(PULL_REQUESTS_CREATED, "Pull requests created.");
    metrics::describe_counter!(PULL_REQUESTS_MERGED, "Pull requests moved to MERGED.");
}

/// Middleware that records one request.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let start = Instant::now();
    let response = next.run(request).await;

    record_request(&method, &path, response.status(), start.elapsed());
    response
}

/// Record a finished request against the current recorder.
pub fn record_request(method: &Method, path: &str, status: StatusCode, elapsed: Duration) {
    let method = method.as_str().to_owned();
    let path = path.to_owned();
    let status_label = status.as_u16().to_string();

    metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status_label.clone()
    )
    .increment(1);

    if status.is_client_error() || status.is_server_error() {
        metrics::counter!(
            ERRORS_TOTAL,
            "method" => method.clone(),
            "path" => path.clone(),
            "status" => status_label
        )
        .increment(1);
    }

    metrics::histogram!(REQUEST_DURATION, "method" => method, "path" => path)
        .record(elapsed.as_secs_f64());
}

pub fn pull_request_created() {
    metrics::counter!(PULL_REQUESTS_CREATED).increment(1);
}

pub fn pull_request_merged() {
    metrics::counter!(PULL_REQUESTS_MERGED).increment(1);
}

/// Router serving `GET /metrics` from `handle`.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(render))
        .with_state(handle)
}

/// GET /metrics
async fn render(State(handle): State<PrometheusHandle>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        handle.render(),
    )
        .into_response()
}
