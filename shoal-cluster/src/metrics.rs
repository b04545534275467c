//! Embedded cluster metrics
//!
//! Counters and histograms for query modes, info requests and background
//! jobs. Without an installed recorder these are no-ops.

use std::time::{Duration, Instant};

/// Record query duration by mode
pub fn record_query_duration(mode: &str, duration: Duration) {
    metrics::histogram!(
        "shoal_query_duration_seconds",
        "mode" => mode.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record query success
pub fn record_query_success(mode: &str) {
    metrics::counter!(
        "shoal_queries_total",
        "mode" => mode.to_string(),
        "status" => "ok",
    )
    .increment(1);
}

/// Record query error
pub fn record_query_error(mode: &str, error_type: &str) {
    metrics::counter!(
        "shoal_queries_total",
        "mode" => mode.to_string(),
        "status" => "error",
    )
    .increment(1);

    metrics::counter!(
        "shoal_query_errors_total",
        "mode" => mode.to_string(),
        "error_type" => error_type.to_string(),
    )
    .increment(1);
}

/// Record records delivered to a foreground query
pub fn record_records_streamed(count: u64) {
    metrics::counter!("shoal_records_streamed_total").increment(count);
}

/// Record an info request and how many nodes answered it
pub fn record_info_request(mode: &str, answered: usize) {
    metrics::counter!(
        "shoal_info_requests_total",
        "mode" => mode.to_string(),
    )
    .increment(1);

    metrics::histogram!(
        "shoal_info_nodes_answered",
        "mode" => mode.to_string(),
    )
    .record(answered as f64);
}

/// Record a background job state change
pub fn record_job(status: &str) {
    metrics::counter!(
        "shoal_background_jobs_total",
        "status" => status.to_string(),
    )
    .increment(1);
}

/// Timer guard for query operations
pub struct QueryTimer {
    mode: &'static str,
    start: Instant,
}

impl QueryTimer {
    /// Start timing a query in the given mode
    pub fn new(mode: &'static str) -> Self {
        Self {
            mode,
            start: Instant::now(),
        }
    }

    /// Record success and duration
    pub fn success(self) {
        record_query_duration(self.mode, self.start.elapsed());
        record_query_success(self.mode);
    }

    /// Record error and duration
    pub fn error(self, error_type: &str) {
        record_query_duration(self.mode, self.start.elapsed());
        record_query_error(self.mode, error_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer() {
        let timer = QueryTimer::new("apply");
        std::thread::sleep(Duration::from_millis(1));
        timer.success();

        let timer = QueryTimer::new("background");
        timer.error("udf_not_found");
    }

    #[test]
    fn test_record_helpers() {
        record_records_streamed(3);
        record_info_request("all", 2);
        record_job("completed");
    }
}
