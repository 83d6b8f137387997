//! # Gate Configuration
//!
//! Defaults plus environment overrides, read once at startup. Any value
//! that is present but unusable is a `ConfigError`, and the process does
//! not start.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `MQTT_BROKER` | `localhost:8883` |
//! | `MQTT_SUBSCRIBE_TOPICS` | `admin/test,alpr/ramp/req,alpr/refresh/lp/whitelist` |
//! | `MQTT_USERNAME` / `MQTT_PASSWORD` | anonymous |
//! | `MQTT_SSL` | `true` |
//! | `MQTT_TLS_CA` / `MQTT_TLS_CERT` / `MQTT_TLS_KEY` | `certs/databus/...` |
//! | `MQTT_CLIENT_ID` | `ramp-gate` |
//! | `MQTT_KEEP_ALIVE_SECS` | `30` |
//! | `MQTT_RECONNECT_DELAY_MS` | `2000` |
//! | `GATE_DB_PATH` | `database/alpr.db` |
//! | `GATE_PLATE_MATCHING` | `exact` |
//! | `GATE_DISPATCH_CAPACITY` | `1024` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rg_01_bus_connection::{AddressError, BrokerAddress, BrokerConfig, Credentials, TlsConfig};
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use shared_types::plate::UnknownPlateMatching;
use shared_types::PlateMatching;
use thiserror::Error;

/// Configuration errors. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: {source}")]
    Address {
        var: &'static str,
        #[source]
        source: AddressError,
    },

    #[error("{var}: expected a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var}: expected true or false, got {value:?}")]
    InvalidBool { var: &'static str, value: String },

    #[error("GATE_PLATE_MATCHING: {0}")]
    PlateMatching(#[from] UnknownPlateMatching),

    #[error("MQTT_SUBSCRIBE_TOPICS: no topics given")]
    NoTopics,

    #[error("MQTT_CLIENT_ID: must not start with whitespace, got {value:?}")]
    InvalidClientId { value: String },
}

/// Complete gate configuration.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Broker connection.
    pub broker: BrokerConfig,
    /// SQLite whitelist database.
    pub db_path: PathBuf,
    /// How request plates are compared with whitelisted plates.
    pub plate_matching: PlateMatching,
    /// Events buffered ahead of the dispatcher.
    pub dispatch_capacity: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            broker: BrokerConfig::default(),
            db_path: PathBuf::from("database/alpr.db"),
            plate_matching: PlateMatching::default(),
            dispatch_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl GateConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup`; unset and empty variables keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        let tls = match get("MQTT_SSL") {
            Some(v) => parse_bool("MQTT_SSL", &v)?,
            None => true,
        };

        if let Some(raw) = get("MQTT_BROKER") {
            config.broker.address = BrokerAddress::parse(&raw, tls).map_err(|source| {
                ConfigError::Address {
                    var: "MQTT_BROKER",
                    source,
                }
            })?;
        } else if !tls {
            config.broker.address = BrokerAddress::parse("localhost", false).map_err(
                |source| ConfigError::Address {
                    var: "MQTT_BROKER",
                    source,
                },
            )?;
        }

        if tls {
            let mut paths = TlsConfig::default();
            if let Some(ca) = get("MQTT_TLS_CA") {
                paths.ca_path = ca.into();
            }
            if let Some(cert) = get("MQTT_TLS_CERT") {
                paths.cert_path = cert.into();
            }
            if let Some(key) = get("MQTT_TLS_KEY") {
                paths.key_path = key.into();
            }
            config.broker.tls = Some(paths);
        } else {
            config.broker.tls = None;
        }

        if let Some(raw) = get("MQTT_SUBSCRIBE_TOPICS") {
            let topics: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            if topics.is_empty() {
                return Err(ConfigError::NoTopics);
            }
            config.broker.topics = topics;
        }

        if let Some(username) = get("MQTT_USERNAME") {
            config.broker.credentials = Some(Credentials {
                username,
                password: lookup("MQTT_PASSWORD").unwrap_or_default(),
            });
        }

        if let Some(id) = get("MQTT_CLIENT_ID") {
            config.broker.client_id = parse_client_id(&id)?;
        }
        if let Some(v) = get("MQTT_KEEP_ALIVE_SECS") {
            config.broker.keep_alive = Duration::from_secs(parse_positive("MQTT_KEEP_ALIVE_SECS", &v)?);
        }
        if let Some(v) = get("MQTT_RECONNECT_DELAY_MS") {
            config.broker.reconnect_delay =
                Duration::from_millis(parse_positive("MQTT_RECONNECT_DELAY_MS", &v)?);
        }

        if let Some(path) = get("GATE_DB_PATH") {
            config.db_path = path.into();
        }
        if let Some(v) = get("GATE_PLATE_MATCHING") {
            config.plate_matching = PlateMatching::from_str(&v)?;
        }
        if let Some(v) = get("GATE_DISPATCH_CAPACITY") {
            config.dispatch_capacity = parse_positive("GATE_DISPATCH_CAPACITY", &v)? as usize;
        }

        Ok(config)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

/// The MQTT client refuses ids with leading whitespace; catch them here
/// rather than at connect time.
fn parse_client_id(value: &str) -> Result<String, ConfigError> {
    if value.starts_with(char::is_whitespace) {
        return Err(ConfigError::InvalidClientId {
            value: value.to_string(),
        });
    }
    Ok(value.trim_end().to_string())
}

fn parse_positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        })
}
