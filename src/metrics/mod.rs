//! Metrics collection for observability

use crate::engine::models::DetectResult;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_vec_with_registry, Counter, CounterVec, HistogramVec, Opts, Registry,
};
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Validation metrics
    pub cases_validated: CounterVec,
    pub anchor_fallbacks: Counter,

    // Detection service API metrics
    pub api_requests: CounterVec,
    pub api_request_duration: HistogramVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let cases_validated = register_counter_vec_with_registry!(
            Opts::new("cases_validated_total", "Total test cases validated"),
            &["result"],
            registry
        )?;

        let anchor_fallbacks = register_counter_with_registry!(
            Opts::new(
                "anchor_fallbacks_total",
                "Detection-event groups whose anchor search fell back to frame 0"
            ),
            registry
        )?;

        let api_requests = register_counter_vec_with_registry!(
            Opts::new("detection_api_requests_total", "Total detection service requests"),
            &["endpoint", "status"],
            registry
        )?;

        let api_request_duration = register_histogram_vec_with_registry!(
            "detection_api_request_duration_seconds",
            "Detection service request duration in seconds",
            &["endpoint"],
            registry
        )?;

        Ok(Self {
            registry,
            cases_validated,
            anchor_fallbacks,
            api_requests,
            api_request_duration,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record one validated test case
    pub fn record_case(&self, result: DetectResult) {
        let label = match result {
            DetectResult::Passed => "passed",
            DetectResult::Failed => "failed",
        };
        self.cases_validated.with_label_values(&[label]).inc();
    }

    /// Record an anchor search that fell back to frame 0
    pub fn record_anchor_fallback(&self) {
        self.anchor_fallbacks.inc();
    }

    /// Record a detection service request
    pub fn record_api_request(&self, endpoint: &str, success: bool) {
        let status = if success { "success" } else { "error" };
        self.api_requests.with_label_values(&[endpoint, status]).inc();
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}
