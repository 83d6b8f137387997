//! The authorization rule.
//!
//! A plate may pass on `date` iff some entry has a matching plate and
//! `validFrom <= date <= validTo`, both ends inclusive, at calendar-date
//! granularity. Overlapping entries do not change the outcome; the first
//! match (lowest id) is reported.

use chrono::NaiveDate;
use shared_types::{PlateMatching, WhitelistEntry, WhitelistSnapshot};

/// First entry authorizing `plate` on `date`, if any.
pub fn find_authorized<'a>(
    snapshot: &'a WhitelistSnapshot,
    plate: &'a str,
    date: NaiveDate,
    matching: PlateMatching,
) -> Option<&'a WhitelistEntry> {
    snapshot
        .candidates(plate, matching)
        .find(|entry| entry.is_valid_on(date))
}

#[must_use]
pub fn is_authorized(
    snapshot: &WhitelistSnapshot,
    plate: &str,
    date: NaiveDate,
    matching: PlateMatching,
) -> bool {
    find_authorized(snapshot, plate, date, matching).is_some()
}
