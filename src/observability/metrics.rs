//! Request metrics.
//!
//! # Metrics
//! - `cms_requests_total` (counter): requests by method and final status
//! - `cms_request_duration_seconds` (histogram): latency by method
//!
//! Recorded through the `metrics` facade; the host application installs the
//! recorder/exporter. Without one these calls are no-ops.

use std::time::Instant;

pub fn record_request(method: &'static str, status: u16, start: Instant) {
    let duration = start.elapsed().as_secs_f64();

    ::metrics::counter!(
        "cms_requests_total",
        "method" => method,
        "status" => status.to_string()
    )
    .increment(1);

    ::metrics::histogram!("cms_request_duration_seconds", "method" => method).record(duration);
}
