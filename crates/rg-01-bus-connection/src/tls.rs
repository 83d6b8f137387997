//! TLS material loading.
//!
//! A TLS setup that cannot be read is not fatal: the connection falls back
//! to the options built so far and keeps trying, so topics the broker
//! serves without TLS stay reachable.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::TlsConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TlsError {
    #[error("Cannot read {role} at {path}: {reason}")]
    Unreadable {
        role: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("{role} at {path} is empty")]
    Empty { role: &'static str, path: PathBuf },
}

/// PEM bytes for CA, client certificate and client key.
#[derive(Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    pub ca: Vec<u8>,
    pub cert: Vec<u8>,
    pub key: Vec<u8>,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("ca", &self.ca.len())
            .field("cert", &self.cert.len())
            .field("key", &"<redacted>")
            .finish()
    }
}

impl TlsMaterial {
    /// Read all three files. The first failure is reported.
    pub fn load(config: &TlsConfig) -> Result<Self, TlsError> {
        Ok(Self {
            ca: read_pem("CA certificate", &config.ca_path)?,
            cert: read_pem("client certificate", &config.cert_path)?,
            key: read_pem("client key", &config.key_path)?,
        })
    }
}

fn read_pem(role: &'static str, path: &Path) -> Result<Vec<u8>, TlsError> {
    let bytes = fs::read(path).map_err(|e| TlsError::Unreadable {
        role,
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(TlsError::Empty {
            role,
            path: path.to_path_buf(),
        });
    }
    Ok(bytes)
}
