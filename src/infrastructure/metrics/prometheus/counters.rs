use metrics::{counter, histogram};
use std::time::Instant;

/// Count a login attempt by flow ("user" | "admin") and outcome.
pub fn increment_login(flow: &str, outcome: &str) {
    counter!("portal_logins_total", "flow" => flow.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

/// Count a created user by source ("signup" | "admin").
pub fn increment_user_created(source: &str) {
    counter!("portal_users_created_total", "source" => source.to_string()).increment(1);
}

/// Count an admin mutation on a user record.
pub fn increment_admin_action(action: &str) {
    counter!("portal_admin_actions_total", "action" => action.to_string()).increment(1);
}

/// Track HTTP request latency using a histogram.
pub fn track_http_request(start: Instant, path: &str, method: &str, status: u16) {
    let elapsed = start.elapsed();
    histogram!(
        "http_request_duration_seconds",
        "path" => path.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(elapsed);
}
