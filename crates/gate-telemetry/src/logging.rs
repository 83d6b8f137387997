//! Process-wide `tracing` subscriber.
//!
//! Plain lines for local runs, JSON for log shippers. Either way the fields
//! recorded by the components (`plate`, `topic`, `kind`, ...) come through
//! as structured fields.

use tracing_subscriber::{fmt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global subscriber. Fails if one is already installed or the
/// filter directive does not parse.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(&config.log_level)?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_thread_ids(true);

    let installed = if config.json_logs {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| TelemetryError::Logging(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

fn build_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::Config(format!("{directive:?}: {e}")))
}
