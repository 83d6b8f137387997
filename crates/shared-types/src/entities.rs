//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Whitelist**: `EntryId`, `StoredEntry`, `WhitelistEntry`
//! - **Bus payloads**: `AccessRequest`, `ActuationCommand`, `WhitelistChanged`

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{DateParseError, ValidityWindow};
use crate::errors::MalformedEventError;

// =============================================================================
// CLUSTER A: THE WHITELIST
// =============================================================================

/// Opaque identifier of a whitelist entry, assigned by the CRUD layer at
/// creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A whitelist row exactly as the persistent store returns it.
///
/// Bounds are kept verbatim; they are only interpreted when a snapshot is
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry {
    pub id: String,
    pub license_plate: String,
    pub valid_from: String,
    pub valid_to: String,
}

impl StoredEntry {
    pub fn new(
        id: impl Into<String>,
        license_plate: impl Into<String>,
        valid_from: impl Into<String>,
        valid_to: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            license_plate: license_plate.into(),
            valid_from: valid_from.into(),
            valid_to: valid_to.into(),
        }
    }
}

/// One authorization record: a plate and the calendar days it may pass.
///
/// Plates are not unique. Two entries may share a plate with different
/// windows; callers must consider every candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistEntry {
    /// Immutable identifier.
    pub id: EntryId,
    /// Plate as entered by the operator.
    pub license_plate: String,
    /// Inclusive validity window.
    #[serde(flatten)]
    pub validity: ValidityWindow,
}

impl WhitelistEntry {
    pub fn new(
        id: impl Into<EntryId>,
        license_plate: impl Into<String>,
        validity: ValidityWindow,
    ) -> Self {
        Self {
            id: id.into(),
            license_plate: license_plate.into(),
            validity,
        }
    }

    /// Whether this entry authorizes passage on `date`.
    #[must_use]
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.validity.contains(date)
    }
}

impl TryFrom<&StoredEntry> for WhitelistEntry {
    type Error = DateParseError;

    fn try_from(stored: &StoredEntry) -> Result<Self, Self::Error> {
        let validity = ValidityWindow::parse(&stored.valid_from, &stored.valid_to)?;
        Ok(Self::new(
            stored.id.as_str(),
            stored.license_plate.as_str(),
            validity,
        ))
    }
}

// =============================================================================
// CLUSTER B: BUS PAYLOADS
// =============================================================================

/// An access request as published by the plate reader.
///
/// Unknown fields are ignored; only `licensePlate` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    pub license_plate: String,
}

impl AccessRequest {
    pub fn new(license_plate: impl Into<String>) -> Self {
        Self {
            license_plate: license_plate.into(),
        }
    }

    /// Decode a request from a raw bus payload.
    ///
    /// Fails on non-UTF-8 or non-JSON bytes, a missing or non-string
    /// `licensePlate`, and on a blank plate.
    pub fn from_payload(payload: &[u8]) -> Result<Self, MalformedEventError> {
        let request: Self = serde_json::from_slice(payload)
            .map_err(|e| MalformedEventError::Decode(e.to_string()))?;

        if request.license_plate.trim().is_empty() {
            return Err(MalformedEventError::EmptyPlate);
        }

        Ok(request)
    }
}

/// Instruction for the ramp controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActuationCommand {
    pub event_type: String,
    pub details: String,
    pub value: u8,
}

impl ActuationCommand {
    /// `eventType` of the open command.
    pub const OPEN_RAMP_EVENT: &'static str = "command-open-ramp";

    /// The command that raises the ramp.
    #[must_use]
    pub fn open_ramp() -> Self {
        Self {
            event_type: Self::OPEN_RAMP_EVENT.to_string(),
            details: "open-ramp".to_string(),
            value: 1,
        }
    }

    /// Serialize to the JSON wire form.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Marker payload announcing that the whitelist table changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistChanged {
    pub event_type: String,
}

impl WhitelistChanged {
    pub const EVENT_TYPE: &'static str = "refresh-licensePlateWhitelist";
}

impl Default for WhitelistChanged {
    fn default() -> Self {
        Self {
            event_type: Self::EVENT_TYPE.to_string(),
        }
    }
}
