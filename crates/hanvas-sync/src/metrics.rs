//! Feed client metrics.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Remote feed requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "hanvas_feed_requests_total";

    /// Remote feed request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "hanvas_feed_latency_seconds";

    /// Switches from the remote feed to the local store.
    pub const FALLBACKS_TOTAL: &str = "hanvas_feed_fallbacks_total";
}

/// Record a completed remote request. `status` is 0 when no response arrived.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a fallback to local mode.
pub fn record_fallback(operation: &str) {
    counter!(
        names::FALLBACKS_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}
