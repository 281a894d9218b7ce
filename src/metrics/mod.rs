//! Prometheus metrics for solsearch
//!
//! This module provides observability through Prometheus-compatible metrics
//! for search, storage, and embedding operations.

use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Search metrics
    // ============================================================================

    /// Total number of search requests
    pub static ref SEARCH_REQUESTS: Counter = Counter::with_opts(
        Opts::new(
            "solsearch_search_requests_total",
            "Total number of search requests"
        )
    ).expect("Failed to create SEARCH_REQUESTS counter");

    /// Search request latency in seconds
    pub static ref SEARCH_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "solsearch_search_latency_seconds",
            "Search request latency in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])
    ).expect("Failed to create SEARCH_LATENCY histogram");

    /// Number of search results returned per request
    pub static ref SEARCH_RESULTS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "solsearch_search_results_count",
            "Number of search results returned per request"
        ).buckets(vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0])
    ).expect("Failed to create SEARCH_RESULTS histogram");

    // ============================================================================
    // Store metrics
    // ============================================================================

    /// Total number of stored solutions
    pub static ref STORED_SOLUTIONS: Gauge = Gauge::with_opts(
        Opts::new(
            "solsearch_stored_solutions_total",
            "Total number of stored solutions"
        )
    ).expect("Failed to create STORED_SOLUTIONS gauge");

    /// Number of stored solutions carrying an embedding
    pub static ref EMBEDDED_SOLUTIONS: Gauge = Gauge::with_opts(
        Opts::new(
            "solsearch_embedded_solutions_total",
            "Number of stored solutions carrying an embedding"
        )
    ).expect("Failed to create EMBEDDED_SOLUTIONS gauge");

    // ============================================================================
    // Embedding metrics
    // ============================================================================

    /// Total embedding generation requests
    pub static ref EMBEDDING_REQUESTS: Counter = Counter::with_opts(
        Opts::new(
            "solsearch_embedding_requests_total",
            "Total embedding generation requests"
        )
    ).expect("Failed to create EMBEDDING_REQUESTS counter");

    /// Embedding generation latency in seconds
    pub static ref EMBEDDING_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "solsearch_embedding_latency_seconds",
            "Embedding generation latency in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0])
    ).expect("Failed to create EMBEDDING_LATENCY histogram");

    // ============================================================================
    // Backfill metrics
    // ============================================================================

    /// Solutions embedded by backfill runs
    pub static ref BACKFILL_RECORDS: Counter = Counter::with_opts(
        Opts::new(
            "solsearch_backfill_records_total",
            "Solutions embedded by backfill runs"
        )
    ).expect("Failed to create BACKFILL_RECORDS counter");

    /// Solutions a backfill run failed to embed
    pub static ref BACKFILL_FAILURES: Counter = Counter::with_opts(
        Opts::new(
            "solsearch_backfill_failures_total",
            "Solutions a backfill run failed to embed"
        )
    ).expect("Failed to create BACKFILL_FAILURES counter");
}

/// Register all metrics with the global registry
///
/// This function should be called once at application startup.
/// Panics if metrics registration fails.
pub fn register_metrics() {
    REGISTRY
        .register(Box::new(SEARCH_REQUESTS.clone()))
        .expect("Failed to register SEARCH_REQUESTS");
    REGISTRY
        .register(Box::new(SEARCH_LATENCY.clone()))
        .expect("Failed to register SEARCH_LATENCY");
    REGISTRY
        .register(Box::new(SEARCH_RESULTS.clone()))
        .expect("Failed to register SEARCH_RESULTS");
    REGISTRY
        .register(Box::new(STORED_SOLUTIONS.clone()))
        .expect("Failed to register STORED_SOLUTIONS");
    REGISTRY
        .register(Box::new(EMBEDDED_SOLUTIONS.clone()))
        .expect("Failed to register EMBEDDED_SOLUTIONS");
    REGISTRY
        .register(Box::new(EMBEDDING_REQUESTS.clone()))
        .expect("Failed to register EMBEDDING_REQUESTS");
    REGISTRY
        .register(Box::new(EMBEDDING_LATENCY.clone()))
        .expect("Failed to register EMBEDDING_LATENCY");
    REGISTRY
        .register(Box::new(BACKFILL_RECORDS.clone()))
        .expect("Failed to register BACKFILL_RECORDS");
    REGISTRY
        .register(Box::new(BACKFILL_FAILURES.clone()))
        .expect("Failed to register BACKFILL_FAILURES");
}

/// Gather all metrics and encode them in Prometheus text format
///
/// Returns a string containing all registered metrics in the Prometheus
/// exposition format, suitable for scraping by Prometheus.
///
/// Returns an empty string if encoding fails (which should not happen with valid metrics).
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Metrics contained invalid UTF-8: {}", e);
        String::new()
    })
}

/// Get current metric values in a human-readable format
///
/// This is useful for the CLI stats command.
pub struct MetricSnapshot {
    pub search_requests_total: f64,
    pub search_latency_avg: f64,
    pub search_results_avg: f64,
    pub stored_solutions: f64,
    pub embedded_solutions: f64,
    pub embedding_requests_total: f64,
    pub embedding_latency_avg: f64,
}

impl MetricSnapshot {
    /// Capture the current state of all metrics
    pub fn capture() -> Self {
        Self {
            search_requests_total: SEARCH_REQUESTS.get(),
            search_latency_avg: calculate_histogram_avg(&SEARCH_LATENCY),
            search_results_avg: calculate_histogram_avg(&SEARCH_RESULTS),
            stored_solutions: STORED_SOLUTIONS.get(),
            embedded_solutions: EMBEDDED_SOLUTIONS.get(),
            embedding_requests_total: EMBEDDING_REQUESTS.get(),
            embedding_latency_avg: calculate_histogram_avg(&EMBEDDING_LATENCY),
        }
    }
}

/// Calculate the average value from a histogram
fn calculate_histogram_avg(histogram: &Histogram) -> f64 {
    let count = histogram.get_sample_count();
    if count == 0 {
        return 0.0;
    }
    histogram.get_sample_sum() / count as f64
}
