//! # Whitelist Snapshot
//!
//! An immutable point-in-time copy of the whitelist, keyed by entry id and
//! indexed by normalized plate.
//!
//! ## Invariants
//!
//! - A snapshot is never mutated after construction. Refreshing the
//!   whitelist means building a new snapshot and swapping the handle.
//! - `plate_index` always covers exactly the ids in `entries`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::entities::{EntryId, WhitelistEntry};
use crate::plate::{normalize_plate, PlateMatching};

#[derive(Debug, Clone, Default)]
pub struct WhitelistSnapshot {
    /// Monotonic build counter; 0 is the empty startup snapshot.
    version: u64,
    /// When the underlying rows were fetched.
    loaded_at: Option<DateTime<Utc>>,
    entries: HashMap<EntryId, WhitelistEntry>,
    /// Normalized plate -> ids, sorted so candidate order is stable.
    plate_index: HashMap<String, Vec<EntryId>>,
}

impl WhitelistSnapshot {
    /// The snapshot a process starts with: version 0, no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot. A repeated id keeps the last entry seen.
    pub fn from_entries(
        version: u64,
        loaded_at: DateTime<Utc>,
        entries: impl IntoIterator<Item = WhitelistEntry>,
    ) -> Self {
        let entries: HashMap<EntryId, WhitelistEntry> = entries
            .into_iter()
            .map(|entry| (entry.id.clone(), entry))
            .collect();

        let mut plate_index: HashMap<String, Vec<EntryId>> = HashMap::new();
        for entry in entries.values() {
            plate_index
                .entry(normalize_plate(&entry.license_plate))
                .or_default()
                .push(entry.id.clone());
        }
        for ids in plate_index.values_mut() {
            ids.sort();
        }

        Self {
            version,
            loaded_at: Some(loaded_at),
            entries,
            plate_index,
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &EntryId) -> Option<&WhitelistEntry> {
        self.entries.get(id)
    }

    /// All entries, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &WhitelistEntry> {
        self.entries.values()
    }

    /// Entries whose plate matches `plate` under `matching`, ordered by id.
    ///
    /// The index is keyed by normalized plate, which is a superset of exact
    /// matches; the policy then filters the bucket.
    pub fn candidates<'a>(
        &'a self,
        plate: &'a str,
        matching: PlateMatching,
    ) -> impl Iterator<Item = &'a WhitelistEntry> + 'a {
        self.plate_index
            .get(&normalize_plate(plate))
            .into_iter()
            .flatten()
            .filter_map(move |id| self.entries.get(id))
            .filter(move |entry| matching.matches(&entry.license_plate, plate))
    }

    /// Whether both snapshots hold the same set of entries, ignoring
    /// version and load time.
    #[must_use]
    pub fn same_entries(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ValidityWindow;
    use chrono::NaiveDate;

    fn window(from: &str, to: &str) -> ValidityWindow {
        ValidityWindow::new(
            NaiveDate::parse_from_str(from, "%Y-%m-%d").unwrap(),
            NaiveDate::parse_from_str(to, "%Y-%m-%d").unwrap(),
        )
    }

    fn sample() -> WhitelistSnapshot {
        WhitelistSnapshot::from_entries(
            1,
            Utc::now(),
            vec![
                WhitelistEntry::new("b", "ABC123", window("2024-01-01", "2024-06-30")),
                WhitelistEntry::new("a", "ABC123", window("2024-07-01", "2024-12-31")),
                WhitelistEntry::new("c", "abc-123", window("2024-01-01", "2024-12-31")),
                WhitelistEntry::new("d", "XYZ999", window("2024-01-01", "2024-12-31")),
            ],
        )
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = WhitelistSnapshot::empty();
        assert_eq!(snapshot.version(), 0);
        assert!(snapshot.is_empty());
        assert!(snapshot.loaded_at().is_none());
        assert_eq!(snapshot.candidates("ABC123", PlateMatching::Exact).count(), 0);
    }

    #[test]
    fn test_exact_candidates_sorted_by_id() {
        let snapshot = sample();
        let ids: Vec<_> = snapshot
            .candidates("ABC123", PlateMatching::Exact)
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_normalized_candidates_include_variants() {
        let snapshot = sample();
        let ids: Vec<_> = snapshot
            .candidates("abc 123", PlateMatching::Normalized)
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(snapshot.candidates("abc 123", PlateMatching::Exact).count(), 0);
    }

    #[test]
    fn test_duplicate_id_keeps_last() {
        let snapshot = WhitelistSnapshot::from_entries(
            2,
            Utc::now(),
            vec![
                WhitelistEntry::new("1", "OLD111", window("2024-01-01", "2024-12-31")),
                WhitelistEntry::new("1", "NEW222", window("2024-01-01", "2024-12-31")),
            ],
        );
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.candidates("OLD111", PlateMatching::Exact).count(), 0);
        assert_eq!(snapshot.candidates("NEW222", PlateMatching::Exact).count(), 1);
    }

    #[test]
    fn test_same_entries_ignores_version() {
        let first = sample();
        let mut entries: Vec<_> = first.entries().cloned().collect();
        entries.reverse();
        let second = WhitelistSnapshot::from_entries(7, Utc::now(), entries);
        assert!(first.same_entries(&second));
        assert_ne!(first.version(), second.version());
        assert!(!first.same_entries(&WhitelistSnapshot::empty()));
    }
}
