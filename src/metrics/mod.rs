//! Prometheus metrics for the search service
//!
//! All collectors live in a process-wide registry. They can be updated
//! before [`init_metrics`] runs; registration only controls whether they
//! appear in [`gather_metrics`] output.
//!
//! # Example
//! ```no_run
//! use debounced_search::metrics::{self, QUERY_UPDATES_TOTAL};
//!
//! metrics::init_metrics().expect("metrics registered once");
//! QUERY_UPDATES_TOTAL.inc();
//! println!("{}", metrics::gather_metrics());
//! ```

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Gauge, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry};

const NAMESPACE: &str = "debounced_search";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Pipeline Metrics
    // ============================================================================

    /// Raw query edits received, before debouncing
    pub static ref QUERY_UPDATES_TOTAL: Counter = Counter::with_opts(
        Opts::new("query_updates_total", "Total number of raw query updates")
            .namespace(NAMESPACE)
    ).expect("Failed to create QUERY_UPDATES_TOTAL metric");

    /// Accepted computations
    ///
    /// Labels: path (blank, filtered)
    pub static ref SEARCH_COMPUTATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("search_computations_total", "Total number of accepted search computations")
            .namespace(NAMESPACE),
        &["path"]
    ).expect("Failed to create SEARCH_COMPUTATIONS_TOTAL metric");

    /// Computations cancelled or discarded before publication
    pub static ref SEARCH_SUPERSEDED_TOTAL: Counter = Counter::with_opts(
        Opts::new("search_superseded_total", "Total number of superseded search computations")
            .namespace(NAMESPACE)
    ).expect("Failed to create SEARCH_SUPERSEDED_TOTAL metric");

    /// Backend failures
    ///
    /// Labels: backend
    pub static ref SEARCH_FAILURES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("search_failures_total", "Total number of failed search computations")
            .namespace(NAMESPACE),
        &["backend"]
    ).expect("Failed to create SEARCH_FAILURES_TOTAL metric");

    /// Backend computation duration in seconds, processing delay included
    ///
    /// Labels: backend
    pub static ref SEARCH_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "search_duration_seconds",
            "Search computation duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0]),
        &["backend"]
    ).expect("Failed to create SEARCH_DURATION_SECONDS metric");

    /// Pipelines with a running worker
    pub static ref SEARCH_PIPELINES_ACTIVE: Gauge = Gauge::with_opts(
        Opts::new("search_pipelines_active", "Number of running search pipelines")
            .namespace(NAMESPACE)
    ).expect("Failed to create SEARCH_PIPELINES_ACTIVE metric");

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    /// HTTP requests handled
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// Open WebSocket sessions
    pub static ref WEBSOCKET_SESSIONS_ACTIVE: Gauge = Gauge::with_opts(
        Opts::new("websocket_sessions_active", "Number of open WebSocket sessions")
            .namespace(NAMESPACE)
    ).expect("Failed to create WEBSOCKET_SESSIONS_ACTIVE metric");

    // ============================================================================
    // System Metrics
    // ============================================================================

    /// Build information
    ///
    /// Labels: version
    pub static ref BUILD_INFO: GaugeVec = GaugeVec::new(
        Opts::new("build_info", "Build information")
            .namespace(NAMESPACE),
        &["version"]
    ).expect("Failed to create BUILD_INFO metric");
}

/// Register all collectors with the global registry
///
/// Fails if called more than once per process.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(QUERY_UPDATES_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_COMPUTATIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_SUPERSEDED_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_FAILURES_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_PIPELINES_ACTIVE.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(WEBSOCKET_SESSIONS_ACTIVE.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(BUILD_INFO.clone()))?;

    BUILD_INFO
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .set(1.0);

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Render all registered metrics in the Prometheus text exposition format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_once() {
        // Another test may have registered first
        let _ = init_metrics();
        assert!(init_metrics().is_err());
    }

    #[test]
    fn test_computation_counter() {
        SEARCH_COMPUTATIONS_TOTAL.with_label_values(&["blank"]).inc();

        let value = SEARCH_COMPUTATIONS_TOTAL.with_label_values(&["blank"]).get();
        assert!(value >= 1.0);
    }

    #[test]
    fn test_gather_metrics() {
        let _ = init_metrics();
        QUERY_UPDATES_TOTAL.inc();

        let metrics = gather_metrics();
        assert!(metrics.contains("debounced_search_query_updates_total"));
    }
}
