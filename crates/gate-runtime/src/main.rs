//! # Ramp Gate
//!
//! License-plate gated ramp access control.
//!
//! ## Startup
//!
//! 1. Initialize logging and metrics
//! 2. Load configuration from the environment (errors are fatal)
//! 3. Open the whitelist database
//! 4. Start the runtime (initial load, handlers, broker connection)
//! 5. Run until Ctrl-C or SIGTERM

use anyhow::{Context, Result};
use gate_runtime::{GateConfig, GateRuntime};
use gate_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("failed to initialize telemetry")?;

    let config = GateConfig::from_env().context("invalid configuration")?;
    info!(
        broker = %config.broker.address,
        tls = config.broker.tls.is_some(),
        db = %config.db_path.display(),
        matching = ?config.plate_matching,
        "Configuration loaded"
    );

    let runtime = GateRuntime::open(config).context("failed to open whitelist database")?;
    runtime.start().await.context("failed to start runtime")?;

    info!("Gate is running. Press Ctrl+C to stop.");
    wait_for_signal().await?;

    runtime.shutdown().await;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("failed to listen for Ctrl+C")?,
        _ = terminate.recv() => info!("SIGTERM received"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")
}
