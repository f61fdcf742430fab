use std::sync::Arc;
use std::time::Instant;

/// Abstraction for application metrics (counters, histograms).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record a login attempt. `flow` is "user" or "admin".
    fn record_login(&self, flow: &str, outcome: &str);

    /// Record a user record created by signup or by an admin.
    fn record_user_created(&self, source: &str);

    /// Record an admin mutation ("update", "delete", "block", "unblock").
    fn record_admin_action(&self, action: &str);

    /// Record HTTP request duration and labels.
    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
