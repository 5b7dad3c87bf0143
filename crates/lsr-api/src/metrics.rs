//! Prometheus metrics for request traffic and review activity.

use std::{sync::LazyLock, time::Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use lsr_srs::ReconcileAction;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use regex::{Captures, Regex};

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("http_request_duration_seconds".to_string()),
        &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5],
    )?;

    Ok(builder.install_recorder()?)
}

/// Middleware to record HTTP request metrics
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());

    response
}

static PROBLEM_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/problems/([^/]+)").expect("static regex is valid"));

/// Collapse record keys in paths so each route is one label value.
fn normalize_path(path: &str) -> String {
    PROBLEM_KEY
        .replace(path, |caps: &Captures<'_>| match &caps[1] {
            "solved" | "reschedule" | "export" => caps[0].to_string(),
            _ => "/problems/:key".to_string(),
        })
        .into_owned()
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

/// Count one reconciled solved event
pub fn record_reconcile_action(action: ReconcileAction) {
    counter!("reconcile_actions_total", "action" => action.as_str()).increment(1);
}

/// Count one store round trip
pub fn record_store_operation(operation: &'static str, duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!("store_operations_total", "operation" => operation, "status" => status).increment(1);
    histogram!("store_operation_duration_seconds", "operation" => operation).record(duration_secs);
}

/// Number of problems currently due, the badge count of the extension
pub fn set_reviews_due(count: usize) {
    gauge!("reviews_due").set(count as f64);
}
