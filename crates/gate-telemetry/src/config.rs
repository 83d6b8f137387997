//! Telemetry configuration from environment variables.

use std::env;

/// Logging configuration for a gate process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line.
    pub service_name: String,

    /// Filter directive (`info`, `rg_03_access_decision=debug`, ...)
    pub log_level: String,

    /// Emit JSON instead of human-readable lines.
    pub json_logs: bool,

    /// Include the module target in each line.
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ramp-gate".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            with_target: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GATE_SERVICE_NAME`: Service name (default: ramp-gate)
    /// - `GATE_LOG_LEVEL` or `RUST_LOG`: Filter directive (default: info)
    /// - `GATE_JSON_LOGS`: JSON output (default: false locally, true in containers)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();
        let defaults = Self::default();

        Self {
            service_name: lookup("GATE_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("GATE_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_level),

            json_logs: lookup("GATE_JSON_LOGS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(is_container),

            with_target: defaults.with_target,
        }
    }
}
