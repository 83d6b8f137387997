//! # Reload Ordering
//!
//! A request is evaluated against the whitelist as of its position on the
//! timeline: every refresh queued before it has completed, none queued
//! after it has started.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use rg_02_whitelist_cache::{InMemoryWhitelistStore, WhitelistStore};
    use shared_types::{StoreError, StoredEntry};
    use tokio::sync::Notify;

    use crate::integration::fixtures::Gate;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Store whose next fetch parks until released.
    #[derive(Default)]
    struct GatedStore {
        rows: InMemoryWhitelistStore,
        hold_next: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    impl GatedStore {
        fn hold_next_fetch(&self) {
            self.hold_next.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl WhitelistStore for GatedStore {
        async fn fetch_all_whitelist_entries(&self) -> Result<Vec<StoredEntry>, StoreError> {
            if self.hold_next.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.rows.fetch_all_whitelist_entries().await
        }
    }

    fn row(id: &str, plate: &str) -> StoredEntry {
        StoredEntry::new(id, plate, "2024-01-01", "2024-12-31")
    }

    // =========================================================================
    // TESTS
    // =========================================================================

    #[tokio::test]
    async fn test_request_waits_for_in_flight_reload() {
        let store = Arc::new(GatedStore::default());
        let gate = Gate::start(store.clone(), "2024-06-15").await;

        store.rows.push(row("1", "NEW001"));
        store.hold_next_fetch();
        gate.notify().await;
        tokio::time::timeout(Duration::from_secs(5), store.entered.notified())
            .await
            .unwrap();

        gate.request("NEW001").await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(gate.publisher.attempts(), 0);

        store.release.notify_one();
        gate.settle().await;

        assert_eq!(gate.commands(), 1);
        gate.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_each_request_sees_preceding_refresh() {
        let store = Arc::new(InMemoryWhitelistStore::new());
        let gate = Gate::start(store.clone(), "2024-06-15").await;

        // Alternate the plate in and out of the store. Each request follows
        // a notification, so it must reflect that mutation and no other.
        for round in 0..6 {
            if round % 2 == 0 {
                store.push(row("flip", "FLIP01"));
            } else {
                store.remove("flip");
            }
            gate.notify().await;
            gate.request("FLIP01").await;
        }
        gate.settle().await;

        assert_eq!(gate.commands(), 3);
        gate.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_mutation_without_notification_is_not_visible() {
        let store = Arc::new(InMemoryWhitelistStore::new());
        let gate = Gate::start(store.clone(), "2024-06-15").await;

        store.push(row("1", "QUIET1"));
        gate.request("QUIET1").await;
        gate.settle().await;
        assert_eq!(gate.commands(), 0);

        gate.notify().await;
        gate.request("QUIET1").await;
        gate.settle().await;
        assert_eq!(gate.commands(), 1);

        gate.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_snapshot_versions_advance_per_changed_reload() {
        let store = Arc::new(InMemoryWhitelistStore::with_rows(vec![row("1", "ABC123")]));
        let gate = Gate::start(store.clone(), "2024-06-15").await;
        let cache = gate.runtime.cache();
        let initial = cache.current_snapshot();

        store.push(row("2", "DEF456"));
        gate.notify().await;
        gate.settle().await;

        let refreshed = cache.current_snapshot();
        assert!(refreshed.version() > initial.version());
        assert_eq!(refreshed.len(), 2);
        // A snapshot already handed out is never mutated.
        assert_eq!(initial.len(), 1);

        gate.runtime.shutdown().await;
    }
}
