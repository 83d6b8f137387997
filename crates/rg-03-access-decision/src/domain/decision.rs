//! Terminal states of one access request.

use shared_types::{EntryId, MalformedEventError};

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenialReason {
    /// No entry for the plate covers today.
    NotWhitelisted,
    /// The payload could not be read.
    Malformed(MalformedEventError),
}

/// Outcome of evaluating one access request. There is no retry; both
/// variants are final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Granted {
        plate: String,
        /// The entry that authorized passage.
        entry_id: EntryId,
    },
    Denied {
        /// `None` when the plate could not be extracted.
        plate: Option<String>,
        reason: DenialReason,
    },
}

impl AccessDecision {
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    #[must_use]
    pub fn plate(&self) -> Option<&str> {
        match self {
            Self::Granted { plate, .. } => Some(plate),
            Self::Denied { plate, .. } => plate.as_deref(),
        }
    }

    /// Metric label: `granted`, `denied` or `malformed`.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Granted { .. } => "granted",
            Self::Denied {
                reason: DenialReason::Malformed(_),
                ..
            } => "malformed",
            Self::Denied { .. } => "denied",
        }
    }
}
