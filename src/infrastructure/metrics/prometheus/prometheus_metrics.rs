//! Prometheus metrics implementation.
//!
//! Concrete `Metrics` backed by the global `metrics` crate registry. The
//! helpers in `counters.rs` record into it and `recorder.rs` owns the
//! handle used for rendering.

use crate::domain::Metrics;
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// Holds no state: metrics are registered globally by the `counter!()` and
/// `histogram!()` macros and rendered through the handle in `recorder.rs`.
pub struct PrometheusMetrics {}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_login(&self, flow: &str, outcome: &str) {
        super::increment_login(flow, outcome);
    }

    fn record_user_created(&self, source: &str) {
        super::increment_user_created(source);
    }

    fn record_admin_action(&self, action: &str) {
        super::increment_admin_action(action);
    }

    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16) {
        super::track_http_request(start, path, method, status);
    }
}
