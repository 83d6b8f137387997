//! # Whitelist Cache Service
//!
//! Holds the snapshot in effect and replaces it wholesale on reload.
//!
//! ```text
//! reload():  store ──fetch──→ rows ──build──→ snapshot v(n+1)
//!                                                  │
//!            current: RwLock<Arc<Snapshot>> ←─swap─┘
//!
//! current_snapshot():  clone of the Arc (readers keep their version alive)
//! ```
//!
//! The write lock is held only for the pointer swap, never across the fetch,
//! so a reader sees either the old snapshot or the new one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use gate_telemetry::{
    HistogramTimer, WHITELIST_ENTRIES, WHITELIST_RELOADS, WHITELIST_RELOAD_DURATION,
    WHITELIST_ROWS_SKIPPED,
};
use parking_lot::RwLock;
use shared_types::{StoreError, WhitelistSnapshot};
use tracing::{error, info, warn};

use crate::domain::{build_snapshot, ReloadReport};
use crate::ports::{WhitelistCacheApi, WhitelistStore};

/// Authoritative in-memory whitelist.
pub struct WhitelistCache {
    store: Arc<dyn WhitelistStore>,
    current: RwLock<Arc<WhitelistSnapshot>>,
    versions: AtomicU64,
    /// Serializes reloads so swaps land in version order.
    reloading: tokio::sync::Mutex<()>,
}

impl WhitelistCache {
    /// A cache holding the empty version-0 snapshot. Call `reload` before
    /// serving requests.
    pub fn new(store: Arc<dyn WhitelistStore>) -> Self {
        Self {
            store,
            current: RwLock::new(Arc::new(WhitelistSnapshot::empty())),
            versions: AtomicU64::new(0),
            reloading: tokio::sync::Mutex::new(()),
        }
    }

    /// Fetch every row, build a new snapshot and swap it in.
    ///
    /// A failed fetch leaves the current snapshot untouched.
    pub async fn reload(&self) -> Result<ReloadReport, StoreError> {
        let _serial = self.reloading.lock().await;
        let _timer = HistogramTimer::new(&WHITELIST_RELOAD_DURATION);

        let rows = match self.store.fetch_all_whitelist_entries().await {
            Ok(rows) => rows,
            Err(e) => {
                WHITELIST_RELOADS.with_label_values(&["failed"]).inc();
                let kept = self.current_snapshot();
                error!(
                    error = %e,
                    kept_version = kept.version(),
                    kept_entries = kept.len(),
                    "[rg-02] Whitelist reload failed, keeping previous snapshot"
                );
                return Err(e);
            }
        };

        let version = self.versions.fetch_add(1, Ordering::SeqCst) + 1;
        let built = build_snapshot(version, Utc::now(), &rows);

        for row in &built.skipped {
            warn!(id = %row.id, reason = %row.reason, "[rg-02] Skipping whitelist row");
        }
        for id in &built.inverted {
            warn!(id = %id, "[rg-02] Whitelist entry has validFrom after validTo; it will never match");
        }
        WHITELIST_ROWS_SKIPPED.inc_by(built.skipped.len() as u64);

        let next = Arc::new(built.snapshot);
        let previous = std::mem::replace(&mut *self.current.write(), Arc::clone(&next));
        let unchanged = previous.same_entries(&next);

        WHITELIST_RELOADS.with_label_values(&["ok"]).inc();
        WHITELIST_ENTRIES.set(next.len() as i64);
        info!(
            version,
            entries = next.len(),
            skipped = built.skipped.len(),
            unchanged,
            "[rg-02] Whitelist snapshot swapped in"
        );

        Ok(ReloadReport {
            version,
            entries: next.len(),
            skipped: built.skipped,
            inverted: built.inverted,
            unchanged,
        })
    }

    /// The snapshot in effect right now.
    #[must_use]
    pub fn current_snapshot(&self) -> Arc<WhitelistSnapshot> {
        self.current.read().clone()
    }
}

#[async_trait]
impl WhitelistCacheApi for WhitelistCache {
    async fn reload(&self) -> Result<ReloadReport, StoreError> {
        WhitelistCache::reload(self).await
    }

    fn current_snapshot(&self) -> Arc<WhitelistSnapshot> {
        WhitelistCache::current_snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryWhitelistStore;
    use shared_types::{EntryId, PlateMatching, StoredEntry};

    fn abc123() -> StoredEntry {
        StoredEntry::new("1", "ABC123", "2024-01-01", "2024-12-31")
    }

    fn cache_with(rows: Vec<StoredEntry>) -> (Arc<InMemoryWhitelistStore>, WhitelistCache) {
        let store = Arc::new(InMemoryWhitelistStore::with_rows(rows));
        let cache = WhitelistCache::new(store.clone());
        (store, cache)
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let (_, cache) = cache_with(vec![abc123()]);
        let snapshot = cache.current_snapshot();
        assert_eq!(snapshot.version(), 0);
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_reload_populates() {
        let (_, cache) = cache_with(vec![abc123()]);
        let report = cache.reload().await.unwrap();

        assert_eq!(report.version, 1);
        assert_eq!(report.entries, 1);
        assert!(!report.unchanged);

        let snapshot = cache.current_snapshot();
        assert!(snapshot.get(&EntryId::from("1")).is_some());
    }

    #[tokio::test]
    async fn test_reload_is_idempotent() {
        let (_, cache) = cache_with(vec![
            abc123(),
            StoredEntry::new("2", "XYZ999", "2024-01-01", "2024-12-31"),
        ]);

        cache.reload().await.unwrap();
        let first = cache.current_snapshot();
        let report = cache.reload().await.unwrap();
        let second = cache.current_snapshot();

        assert!(report.unchanged);
        assert!(first.same_entries(&second));
        assert_eq!(second.version(), first.version() + 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_snapshot() {
        let (store, cache) = cache_with(vec![abc123()]);
        cache.reload().await.unwrap();
        let before = cache.current_snapshot();

        store.set_rows(Vec::new());
        store.set_failing(true);

        assert_eq!(cache.reload().await, Err(StoreError::Unavailable));
        let after = cache.current_snapshot();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_first_reload_leaves_empty_cache() {
        let (store, cache) = cache_with(vec![abc123()]);
        store.set_failing(true);

        assert!(cache.reload().await.is_err());
        let snapshot = cache.current_snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.candidates("ABC123", PlateMatching::Exact).count(), 0);
    }

    #[tokio::test]
    async fn test_reader_keeps_old_snapshot_across_swap() {
        let (store, cache) = cache_with(vec![abc123()]);
        cache.reload().await.unwrap();
        let held = cache.current_snapshot();

        store.set_rows(vec![StoredEntry::new("2", "XYZ999", "2024-01-01", "2024-12-31")]);
        cache.reload().await.unwrap();

        assert_eq!(held.candidates("ABC123", PlateMatching::Exact).count(), 1);
        assert_eq!(held.candidates("XYZ999", PlateMatching::Exact).count(), 0);

        let fresh = cache.current_snapshot();
        assert_eq!(fresh.candidates("ABC123", PlateMatching::Exact).count(), 0);
        assert_eq!(fresh.candidates("XYZ999", PlateMatching::Exact).count(), 1);
    }

    #[tokio::test]
    async fn test_bad_rows_reported_not_fatal() {
        let (_, cache) = cache_with(vec![
            abc123(),
            StoredEntry::new("2", "BAD000", "not a date", "2024-12-31"),
            StoredEntry::new("3", "INV000", "2024-12-31", "2024-01-01"),
        ]);

        let report = cache.reload().await.unwrap();
        assert_eq!(report.entries, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.inverted, vec![EntryId::from("3")]);
    }

    #[tokio::test]
    async fn test_concurrent_reloads_swap_in_version_order() {
        let (_, cache) = cache_with(vec![abc123()]);
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.reload().await.unwrap().version })
            })
            .collect();

        let mut versions = Vec::new();
        for handle in handles {
            versions.push(handle.await.unwrap());
        }
        versions.sort_unstable();

        assert_eq!(versions, (1..=8).collect::<Vec<_>>());
        assert_eq!(cache.current_snapshot().version(), 8);
    }
}
