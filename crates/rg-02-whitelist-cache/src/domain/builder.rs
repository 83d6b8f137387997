//! Turning stored rows into a `WhitelistSnapshot`.
//!
//! ## Row policy
//!
//! | Row | Outcome |
//! |-----|---------|
//! | both bounds parse, `validFrom <= validTo` | loaded |
//! | both bounds parse, `validFrom > validTo` | loaded, reported as inverted, never matches |
//! | a bound does not parse | skipped, reported |

use chrono::{DateTime, Utc};
use shared_types::{EntryId, StoredEntry, WhitelistEntry, WhitelistSnapshot};

/// A stored row left out of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub id: String,
    pub reason: String,
}

/// What a reload produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadReport {
    /// Version of the snapshot now in effect.
    pub version: u64,
    /// Entries in the new snapshot.
    pub entries: usize,
    /// Rows the store returned but the snapshot does not contain.
    pub skipped: Vec<SkippedRow>,
    /// Loaded entries whose window is inverted.
    pub inverted: Vec<EntryId>,
    /// The new snapshot holds exactly the entries of the one it replaced.
    pub unchanged: bool,
}

/// A snapshot plus the per-row findings of building it.
#[derive(Debug)]
pub struct BuiltSnapshot {
    pub snapshot: WhitelistSnapshot,
    pub skipped: Vec<SkippedRow>,
    pub inverted: Vec<EntryId>,
}

/// Build a snapshot from stored rows.
pub fn build_snapshot(
    version: u64,
    loaded_at: DateTime<Utc>,
    rows: &[StoredEntry],
) -> BuiltSnapshot {
    let mut skipped = Vec::new();
    let mut inverted = Vec::new();
    let mut entries = Vec::with_capacity(rows.len());

    for row in rows {
        match WhitelistEntry::try_from(row) {
            Ok(entry) => {
                if entry.validity.is_inverted() {
                    inverted.push(entry.id.clone());
                }
                entries.push(entry);
            }
            Err(e) => skipped.push(SkippedRow {
                id: row.id.clone(),
                reason: e.to_string(),
            }),
        }
    }

    BuiltSnapshot {
        snapshot: WhitelistSnapshot::from_entries(version, loaded_at, entries),
        skipped,
        inverted,
    }
}
