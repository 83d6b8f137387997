//! # Gate Telemetry
//!
//! Structured logging and Prometheus metrics shared by every gate crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gate_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _metrics = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATE_LOG_LEVEL` | `info` | Log filter directive (falls back to `RUST_LOG`) |
//! | `GATE_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `GATE_SERVICE_NAME` | `ramp-gate` | Service name in logs |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, ACCESS_REQUESTS,
    BUS_MESSAGES_RECEIVED, COMMANDS_PUBLISHED, CONNECTION_ERRORS, DISPATCHER_EVENTS,
    DISPATCH_BACKPRESSURE,
    HANDLER_FAILURES, WHITELIST_ENTRIES, WHITELIST_RELOADS, WHITELIST_RELOAD_DURATION,
    WHITELIST_ROWS_SKIPPED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install the log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<MetricsHandle, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(config)?;
    Ok(metrics)
}
