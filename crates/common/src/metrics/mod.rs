//! Metrics and observability utilities
//!
//! Counters and histograms for decisions, vetoes, relatedness requests and
//! path search effort, with standardized naming under [`METRICS_PREFIX`].

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all XTE metrics
pub const METRICS_PREFIX: &str = "xte";

/// Buckets for relatedness service latency (in seconds)
pub const SIMILARITY_BUCKETS: &[f64] = &[
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Decision metrics
    describe_counter!(
        format!("{}_pairs_decided_total", METRICS_PREFIX),
        Unit::Count,
        "Total entailment pairs decided"
    );

    describe_histogram!(
        format!("{}_decision_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Time to decide one pair in seconds"
    );

    describe_counter!(
        format!("{}_pairs_failed_total", METRICS_PREFIX),
        Unit::Count,
        "Dataset pairs that could not be decided"
    );

    describe_counter!(
        format!("{}_vetoes_total", METRICS_PREFIX),
        Unit::Count,
        "Context vetoes fired"
    );

    // Relatedness service metrics
    describe_counter!(
        format!("{}_similarity_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total relatedness service requests"
    );

    describe_histogram!(
        format!("{}_similarity_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Relatedness request latency in seconds"
    );

    // Path search metrics
    describe_counter!(
        format!("{}_search_branches_total", METRICS_PREFIX),
        Unit::Count,
        "Path search branches tried"
    );

    describe_counter!(
        format!("{}_search_paths_accepted_total", METRICS_PREFIX),
        Unit::Count,
        "Paths accepted by the path search"
    );

    tracing::info!("Metrics registered");
}

/// Helper to time one pair decision
pub struct DecisionMetrics {
    start: Instant,
}

impl DecisionMetrics {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    /// Record the outcome of the pair
    pub fn finish(self, model: &str, decision: &str) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_pairs_decided_total", METRICS_PREFIX),
            "model" => model.to_string(),
            "decision" => decision.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_decision_duration_seconds", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .record(duration);
    }
}

/// Helper to record a dataset pair that could not be decided
pub fn record_failed_pair(model: &str) {
    counter!(
        format!("{}_pairs_failed_total", METRICS_PREFIX),
        "model" => model.to_string()
    )
    .increment(1);
}

/// Helper to record a fired context veto
pub fn record_veto(test: &str) {
    counter!(
        format!("{}_vetoes_total", METRICS_PREFIX),
        "test" => test.to_string()
    )
    .increment(1);
}

/// Helper to record relatedness requests
pub fn record_similarity(duration_secs: f64, candidates: usize, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_similarity_requests_total", METRICS_PREFIX),
        "status" => status
    )
    .increment(1);

    if success {
        histogram!(format!("{}_similarity_duration_seconds", METRICS_PREFIX)).record(duration_secs);
    }

    tracing::trace!(candidates, status, "Relatedness request recorded");
}

/// Helper to record the effort of one candidate pair search
pub fn record_search(branches_tried: usize, paths_accepted: usize) {
    counter!(format!("{}_search_branches_total", METRICS_PREFIX)).increment(branches_tried as u64);
    counter!(format!("{}_search_paths_accepted_total", METRICS_PREFIX))
        .increment(paths_accepted as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in SIMILARITY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: every helper is a no-op
        let timer = DecisionMetrics::start();
        timer.finish("Graph Navigation", "yes");
        record_veto("negation");
        record_similarity(0.01, 3, true);
        record_search(12, 2);
    }
}
