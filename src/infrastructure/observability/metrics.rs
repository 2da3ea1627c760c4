//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;
use crate::domain::CapDecision;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("keyportal_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

pub fn record_key_issued() {
    counter!("keyportal_keys_issued_total").increment(1);
}

pub fn record_key_revoked() {
    counter!("keyportal_keys_revoked_total").increment(1);
}

pub fn record_cap_decision(decision: &CapDecision) {
    let label = if decision.is_allowed() { "allow" } else { "deny" };
    counter!("keyportal_cap_decisions_total", "decision" => label).increment(1);
}

pub fn record_usage_tokens(model: &str, tokens: u64) {
    counter!("keyportal_usage_tokens_total", "model" => model.to_string()).increment(tokens);
}

pub fn record_audit_write_failure(action: &str) {
    counter!("keyportal_audit_write_failures_total", "action" => action.to_string())
        .increment(1);
}

const MAX_PATH_LABEL_LEN: usize = 50;

/// Sanitize URL path for metric labels (replace IDs, limit cardinality)
fn sanitize_path(path: &str) -> String {
    let sanitized = path
        .split('/')
        .map(|segment| {
            let is_id = uuid::Uuid::parse_str(segment).is_ok()
                || (!segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()));

            if is_id { "{id}" } else { segment }
        })
        .collect::<Vec<_>>()
        .join("/");

    sanitized.chars().take(MAX_PATH_LABEL_LEN).collect()
}
