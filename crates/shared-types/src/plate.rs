//! # Plate Matching Policy
//!
//! How a requested plate is compared with whitelisted plates.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Comparison policy for license plates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateMatching {
    /// Byte-for-byte equality.
    #[default]
    Exact,
    /// Equality after `normalize_plate` on both sides.
    Normalized,
}

impl PlateMatching {
    /// Whether `requested` matches `whitelisted` under this policy.
    #[must_use]
    pub fn matches(self, whitelisted: &str, requested: &str) -> bool {
        match self {
            Self::Exact => whitelisted == requested,
            Self::Normalized => normalize_plate(whitelisted) == normalize_plate(requested),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown plate matching policy {0:?} (expected \"exact\" or \"normalized\")")]
pub struct UnknownPlateMatching(pub String);

impl FromStr for PlateMatching {
    type Err = UnknownPlateMatching;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "normalized" | "normalised" => Ok(Self::Normalized),
            _ => Err(UnknownPlateMatching(s.to_string())),
        }
    }
}

/// Canonical plate form: uppercase, ASCII whitespace and `-` removed.
///
/// `"zg 1234-ab"` and `"ZG1234AB"` normalize to the same key.
#[must_use]
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}
