//! # Calendar Dates
//!
//! Validity bounds are compared at calendar-date granularity. Stored bounds
//! may carry a time of day or an offset; both are normalized away here so
//! that every comparison is between two local `YYYY-MM-DD` dates.
//!
//! For four-digit years the ordering of `NaiveDate` is exactly the lexical
//! ordering of its `YYYY-MM-DD` rendering.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored bound that could not be read as a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized calendar date: {value:?}")]
pub struct DateParseError {
    /// The raw value as stored.
    pub value: String,
}

/// Parse a stored validity bound into a local calendar date.
///
/// Accepted forms:
/// - `2024-06-15`
/// - `2024-06-15 08:30:00` / `2024-06-15T08:30:00.000` (naive, date part kept)
/// - `2024-06-15T08:30:00Z` / `2024-06-15T08:30:00+02:00` (converted to the
///   local time zone before the date is taken)
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let value = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Local).date_naive());
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.date());
        }
    }

    Err(DateParseError {
        value: raw.to_string(),
    })
}

/// Inclusive calendar-date range `[valid_from, valid_to]`.
///
/// An inverted window (`valid_from > valid_to`) is representable and simply
/// contains no date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityWindow {
    /// First valid day.
    pub valid_from: NaiveDate,
    /// Last valid day.
    pub valid_to: NaiveDate,
}

impl ValidityWindow {
    /// Create a window from two calendar dates.
    #[must_use]
    pub fn new(valid_from: NaiveDate, valid_to: NaiveDate) -> Self {
        Self {
            valid_from,
            valid_to,
        }
    }

    /// Parse both bounds from their stored form.
    pub fn parse(valid_from: &str, valid_to: &str) -> Result<Self, DateParseError> {
        Ok(Self::new(
            parse_calendar_date(valid_from)?,
            parse_calendar_date(valid_to)?,
        ))
    }

    /// Whether `date` falls within the window, both ends inclusive.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_to
    }

    /// Whether the bounds are out of order.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.valid_from > self.valid_to
    }
}
