//! Failure metrics.
//!
//! Metrics are emitted through the `metrics` facade; installing a recorder
//! (Prometheus, StatsD, ...) is left to the host application. Without a
//! recorder every call here is a no-op.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `heraldo_request_failures_total` | Counter | `status_class` | Failures normalized into an error response |
//! | `heraldo_validation_issues_total` | Counter | `target` | Field-level issues reported by validation |

use metrics::{counter, describe_counter};

/// Name of the failure counter.
pub const REQUEST_FAILURES_TOTAL: &str = "heraldo_request_failures_total";

/// Name of the validation issue counter.
pub const VALIDATION_ISSUES_TOTAL: &str = "heraldo_validation_issues_total";

/// Registers descriptions for all Heraldo metrics.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(
        REQUEST_FAILURES_TOTAL,
        "Failures converted into an error response, by status class"
    );
    describe_counter!(
        VALIDATION_ISSUES_TOTAL,
        "Field-level validation issues, by validation target"
    );
}

/// Returns the status class label (`"4xx"`, `"5xx"`) for a status code.
#[must_use]
pub const fn status_class(status: u16) -> &'static str {
    match status {
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

/// Records one normalized failure.
pub fn record_failure(status: u16) {
    counter!(REQUEST_FAILURES_TOTAL, "status_class" => status_class(status)).increment(1);
}

/// Records the issues of one failed validation.
pub fn record_validation_issues(target: &'static str, count: usize) {
    counter!(VALIDATION_ISSUES_TOTAL, "target" => target).increment(count as u64);
}
