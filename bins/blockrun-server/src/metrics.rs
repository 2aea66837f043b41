// Prometheus metrics for the Blockrun server

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    // Global registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Blocks submitted total (counter with language label)
    pub static ref BLOCKS_SUBMITTED: CounterVec = CounterVec::new(
        Opts::new("blockrun_blocks_submitted_total", "Total number of code blocks submitted"),
        &["language"]
    )
    .expect("metric can be created");

    // Blocks completed total (counter with language and outcome labels)
    pub static ref BLOCKS_COMPLETED: CounterVec = CounterVec::new(
        Opts::new("blockrun_blocks_completed_total", "Total number of code blocks completed"),
        &["language", "outcome"]
    )
    .expect("metric can be created");

    // Block execution time histogram (in milliseconds)
    pub static ref EXECUTION_TIME: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "blockrun_execution_time_ms",
            "Block execution time in milliseconds"
        )
        .buckets(vec![10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]),
        &["language"]
    )
    .expect("metric can be created");

    // Blocks rejected counter (validation failures)
    pub static ref BLOCKS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("blockrun_blocks_rejected_total", "Total blocks rejected due to validation"),
        &["reason"]
    )
    .expect("metric can be created");
}

/// Initialize metrics registry
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(BLOCKS_SUBMITTED.clone()))
        .expect("collector can be registered");

    REGISTRY
        .register(Box::new(BLOCKS_COMPLETED.clone()))
        .expect("collector can be registered");

    REGISTRY
        .register(Box::new(EXECUTION_TIME.clone()))
        .expect("collector can be registered");

    REGISTRY
        .register(Box::new(BLOCKS_REJECTED.clone()))
        .expect("collector can be registered");
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("metrics encode to text");
    String::from_utf8(buffer).unwrap_or_default()
}

/// Record block submission
pub fn record_block_submitted(language: &str) {
    BLOCKS_SUBMITTED.with_label_values(&[language]).inc();
}

/// Record block rejection
pub fn record_block_rejected(reason: &str) {
    BLOCKS_REJECTED.with_label_values(&[reason]).inc();
}

/// Record block completion
pub fn record_block_completed(language: &str, outcome: &str, execution_time_ms: f64) {
    record_block_outcome(language, outcome);
    record_execution_time(language, execution_time_ms);
}

/// Record a block outcome without a duration observation
///
/// Batch blocks share one wall-clock measurement, so their outcomes are
/// counted individually while the duration is observed once per batch.
pub fn record_block_outcome(language: &str, outcome: &str) {
    BLOCKS_COMPLETED
        .with_label_values(&[language, outcome])
        .inc();
}

/// Record an execution duration
pub fn record_execution_time(language: &str, execution_time_ms: f64) {
    EXECUTION_TIME
        .with_label_values(&[language])
        .observe(execution_time_ms);
}
