//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_audit_write_failure, record_cap_decision,
    record_http_request, record_key_issued, record_key_revoked, record_usage_tokens,
    PrometheusMetrics,
};
