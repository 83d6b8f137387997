//! # Broker Configuration
//!
//! Where to connect, as whom, over what, and which topics to follow.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use shared_types::topics;
use thiserror::Error;

/// Plain MQTT port.
pub const DEFAULT_PORT: u16 = 1883;
/// MQTT over TLS port.
pub const DEFAULT_TLS_PORT: u16 = 8883;

/// Broker address that could not be understood. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Broker address is empty")]
    Empty,

    #[error("Unsupported broker URL scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("Invalid broker port {0:?}")]
    InvalidPort(String),
}

/// Host and port of the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddress {
    pub host: String,
    pub port: u16,
}

impl BrokerAddress {
    /// Parse `host`, `host:port`, `[v6]:port`, optionally prefixed with
    /// `mqtt://`, `mqtts://`, `tcp://` or `ssl://`. Without a port the
    /// default for the transport is used.
    pub fn parse(raw: &str, tls: bool) -> Result<Self, AddressError> {
        let mut rest = raw.trim();
        if let Some((scheme, tail)) = rest.split_once("://") {
            match scheme.to_ascii_lowercase().as_str() {
                "mqtt" | "mqtts" | "tcp" | "ssl" => rest = tail,
                _ => return Err(AddressError::UnsupportedScheme(scheme.to_string())),
            }
        }
        let rest = rest.trim_end_matches('/');
        if rest.is_empty() {
            return Err(AddressError::Empty);
        }

        let default_port = if tls { DEFAULT_TLS_PORT } else { DEFAULT_PORT };

        let (host, port) = if let Some(v6) = rest.strip_prefix('[') {
            let (host, tail) = v6
                .split_once(']')
                .ok_or_else(|| AddressError::InvalidPort(rest.to_string()))?;
            match tail.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None if tail.is_empty() => (host, None),
                None => return Err(AddressError::InvalidPort(tail.to_string())),
            }
        } else {
            match rest.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (rest, None),
            }
        };

        if host.is_empty() {
            return Err(AddressError::Empty);
        }

        let port = match port {
            Some(p) => p
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| AddressError::InvalidPort(p.to_string()))?,
            None => default_port,
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Username and password. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Paths to the PEM files used for a TLS connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub ca_path: PathBuf,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            ca_path: PathBuf::from("certs/databus/ca.crt"),
            cert_path: PathBuf::from("certs/databus/databus-backend.crt"),
            key_path: PathBuf::from("certs/databus/databus-backend.key"),
        }
    }
}

/// Everything the connection needs.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub address: BrokerAddress,
    pub client_id: String,
    /// `None` connects anonymously.
    pub credentials: Option<Credentials>,
    /// `None` connects over plain TCP.
    pub tls: Option<TlsConfig>,
    /// Topics subscribed on every (re)connect.
    pub topics: Vec<String>,
    pub keep_alive: Duration,
    /// Pause after a transport error before polling again.
    pub reconnect_delay: Duration,
    /// Outgoing request queue size of the client.
    pub request_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            address: BrokerAddress {
                host: "localhost".to_string(),
                port: DEFAULT_TLS_PORT,
            },
            client_id: "ramp-gate".to_string(),
            credentials: None,
            tls: Some(TlsConfig::default()),
            topics: topics::DEFAULT_SUBSCRIPTIONS
                .iter()
                .map(|t| t.to_string())
                .collect(),
            keep_alive: Duration::from_secs(30),
            reconnect_delay: Duration::from_millis(2000),
            request_capacity: 64,
        }
    }
}
