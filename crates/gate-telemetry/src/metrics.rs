//! Prometheus metrics for the ramp gate.
//!
//! All metrics follow the naming convention: `rg_<area>_<metric>[_unit]`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // ACCESS DECISION (rg-03)
    // =========================================================================

    /// Access requests by outcome
    pub static ref ACCESS_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("rg_access_requests_total", "Access requests evaluated"),
        &["outcome"]  // granted/denied/malformed
    ).expect("metric creation failed");

    /// Open-ramp commands by publish outcome
    pub static ref COMMANDS_PUBLISHED: IntCounterVec = IntCounterVec::new(
        Opts::new("rg_commands_published_total", "Actuation commands published"),
        &["outcome"]  // ok/failed
    ).expect("metric creation failed");

    // =========================================================================
    // WHITELIST CACHE (rg-02)
    // =========================================================================

    /// Whitelist reloads by outcome
    pub static ref WHITELIST_RELOADS: IntCounterVec = IntCounterVec::new(
        Opts::new("rg_whitelist_reloads_total", "Whitelist snapshot reloads"),
        &["outcome"]  // ok/failed
    ).expect("metric creation failed");

    /// Entries in the current snapshot
    pub static ref WHITELIST_ENTRIES: IntGauge = IntGauge::new(
        "rg_whitelist_entries",
        "Number of entries in the active whitelist snapshot"
    ).expect("metric creation failed");

    /// Stored rows skipped because a bound did not parse
    pub static ref WHITELIST_ROWS_SKIPPED: IntCounter = IntCounter::new(
        "rg_whitelist_rows_skipped_total",
        "Stored whitelist rows skipped during reload"
    ).expect("metric creation failed");

    /// Reload duration
    pub static ref WHITELIST_RELOAD_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "rg_whitelist_reload_duration_seconds",
            "Time spent fetching and rebuilding the whitelist snapshot"
        ).buckets(exponential_buckets(0.0005, 2.0, 14).expect("bucket layout"))
    ).expect("metric creation failed");

    // =========================================================================
    // BUS CONNECTION (rg-01)
    // =========================================================================

    /// Messages received from the broker
    pub static ref BUS_MESSAGES_RECEIVED: IntCounter = IntCounter::new(
        "rg_bus_messages_received_total",
        "Messages received from the broker"
    ).expect("metric creation failed");

    /// Broker messages that found the dispatcher queue full
    pub static ref DISPATCH_BACKPRESSURE: IntCounter = IntCounter::new(
        "rg_dispatch_backpressure_total",
        "Broker messages that waited for room in the dispatcher queue"
    ).expect("metric creation failed");

    /// Broker connection errors
    pub static ref CONNECTION_ERRORS: IntCounter = IntCounter::new(
        "rg_connection_errors_total",
        "Broker connection or subscription errors"
    ).expect("metric creation failed");

    // =========================================================================
    // DISPATCHER
    // =========================================================================

    /// Events dispatched by origin
    pub static ref DISPATCHER_EVENTS: IntCounterVec = IntCounterVec::new(
        Opts::new("rg_dispatcher_events_total", "Events dispatched to handlers"),
        &["origin"]  // broker/internal
    ).expect("metric creation failed");

    /// Handler failures by error kind
    pub static ref HANDLER_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("rg_handler_failures_total", "Event handler failures"),
        &["kind"]  // connection/malformed_event/store/publish
    ).expect("metric creation failed");
}

/// Proof that the gate metrics are registered.
#[derive(Debug)]
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of collectors this call registered.
    #[must_use]
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register all metrics with the global registry.
///
/// Collectors already registered are skipped, so calling this twice is
/// harmless.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Access decision
        Box::new(ACCESS_REQUESTS.clone()),
        Box::new(COMMANDS_PUBLISHED.clone()),
        // Whitelist cache
        Box::new(WHITELIST_RELOADS.clone()),
        Box::new(WHITELIST_ENTRIES.clone()),
        Box::new(WHITELIST_ROWS_SKIPPED.clone()),
        Box::new(WHITELIST_RELOAD_DURATION.clone()),
        // Bus connection
        Box::new(BUS_MESSAGES_RECEIVED.clone()),
        Box::new(CONNECTION_ERRORS.clone()),
        Box::new(DISPATCH_BACKPRESSURE.clone()),
        // Dispatcher
        Box::new(DISPATCHER_EVENTS.clone()),
        Box::new(HANDLER_FAILURES.clone()),
    ];

    let mut registered = 0;
    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) => registered += 1,
            Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { registered })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_is_idempotent() {
        register_metrics().unwrap();
        let second = register_metrics().unwrap();
        assert_eq!(second.registered(), 0);
    }

    #[test]
    fn test_counter_increment() {
        let before = ACCESS_REQUESTS.with_label_values(&["granted"]).get();
        ACCESS_REQUESTS.with_label_values(&["granted"]).inc();
        assert!(ACCESS_REQUESTS.with_label_values(&["granted"]).get() > before);
    }

    #[test]
    fn test_encode_contains_gate_metrics() {
        register_metrics().unwrap();
        WHITELIST_ENTRIES.set(3);
        let text = encode_metrics().unwrap();
        assert!(text.contains("rg_whitelist_entries"));
    }

    #[test]
    fn test_histogram_timer() {
        let before = WHITELIST_RELOAD_DURATION.get_sample_count();
        {
            let _timer = HistogramTimer::new(&WHITELIST_RELOAD_DURATION);
        }
        assert!(WHITELIST_RELOAD_DURATION.get_sample_count() > before);
    }
}
