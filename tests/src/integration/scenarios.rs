//! # Access Scenarios
//!
//! Requests, refreshes and operator mutations delivered through the
//! dispatcher, checked against what the ramp controller would receive.
//!
//! ```text
//! emitter ──► dispatcher ──► AccessRequestHandler ──► RecordingPublisher
//!                  │
//! notifier ────────┴───────► WhitelistRefreshHandler ──► WhitelistCache
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rg_02_whitelist_cache::{InMemoryWhitelistStore, SqliteWhitelistStore};
    use shared_types::{topics, ActuationCommand, PublishError, StoredEntry};

    use crate::integration::fixtures::{date, Gate};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn abc123_for_2024() -> Arc<InMemoryWhitelistStore> {
        Arc::new(InMemoryWhitelistStore::with_rows(vec![StoredEntry::new(
            "1",
            "ABC123",
            "2024-01-01",
            "2024-12-31",
        )]))
    }

    // =========================================================================
    // SCENARIO A: VALID PLATE INSIDE ITS WINDOW
    // =========================================================================

    #[tokio::test]
    async fn test_valid_plate_opens_ramp() {
        let gate = Gate::start(abc123_for_2024(), "2024-06-15").await;

        gate.request("ABC123").await;
        gate.settle().await;

        let published = gate.publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, topics::RAMP_COMMAND);

        let command: ActuationCommand = serde_json::from_slice(&published[0].1).unwrap();
        assert_eq!(command, ActuationCommand::open_ramp());

        let body: serde_json::Value = serde_json::from_slice(&published[0].1).unwrap();
        assert_eq!(body["eventType"], "command-open-ramp");
        assert_eq!(body["details"], "open-ramp");
        assert_eq!(body["value"], 1);

        gate.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_window_bounds_are_inclusive() {
        let gate = Gate::start(abc123_for_2024(), "2024-01-01").await;

        gate.request("ABC123").await;
        gate.clock.set(date("2024-12-31"));
        gate.request("ABC123").await;
        gate.settle().await;

        assert_eq!(gate.commands(), 2);
        gate.runtime.shutdown().await;
    }

    // =========================================================================
    // SCENARIO B: VALID PLATE OUTSIDE ITS WINDOW
    // =========================================================================

    #[tokio::test]
    async fn test_expired_plate_is_denied() {
        let gate = Gate::start(abc123_for_2024(), "2025-01-01").await;

        gate.request("ABC123").await;
        gate.settle().await;

        assert_eq!(gate.publisher.attempts(), 0);
        gate.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_any_matching_entry_grants() {
        let store = Arc::new(InMemoryWhitelistStore::with_rows(vec![
            StoredEntry::new("1", "ABC123", "2023-01-01", "2023-12-31"),
            StoredEntry::new("2", "ABC123", "2024-01-01", "2024-12-31"),
        ]));
        let gate = Gate::start(store, "2024-03-01").await;

        gate.request("ABC123").await;
        gate.settle().await;

        assert_eq!(gate.commands(), 1);
        gate.runtime.shutdown().await;
    }

    // =========================================================================
    // SCENARIO C: INITIAL LOAD FAILED, NO PRIOR DATA
    // =========================================================================

    #[tokio::test]
    async fn test_failed_initial_load_denies_everything() {
        let store = abc123_for_2024();
        store.set_failing(true);
        let gate = Gate::start(store.clone(), "2024-06-15").await;

        gate.request("ABC123").await;
        gate.settle().await;

        assert_eq!(gate.publisher.attempts(), 0);
        let snapshot = gate.runtime.cache().current_snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.version(), 0);

        // Once the store recovers, the next notification fills the cache.
        store.set_failing(false);
        gate.notify().await;
        gate.request("ABC123").await;
        gate.settle().await;

        assert_eq!(gate.commands(), 1);
        gate.runtime.shutdown().await;
    }

    // =========================================================================
    // UNKNOWN PLATE
    // =========================================================================

    #[tokio::test]
    async fn test_unknown_plate_is_denied() {
        let gate = Gate::start(abc123_for_2024(), "2024-06-15").await;

        gate.request("ZZZ000").await;
        gate.request("abc123").await;
        gate.settle().await;

        assert_eq!(gate.publisher.attempts(), 0);
        gate.runtime.shutdown().await;
    }

    // =========================================================================
    // SCENARIO D: OPERATOR ADDS A PLATE
    // =========================================================================

    #[tokio::test]
    async fn test_inserted_plate_granted_after_notification() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteWhitelistStore::open(dir.path().join("gate.db")).unwrap());
        let gate = Gate::start(store.clone(), "2024-06-15").await;

        gate.request("XYZ999").await;

        store.insert("XYZ999", "2024-06-01", "2024-06-30").unwrap();
        gate.notify().await;
        gate.request("XYZ999").await;
        gate.settle().await;

        // Only the request queued after the notification sees the new row.
        assert_eq!(gate.publisher.attempts(), 1);
        assert_eq!(gate.commands(), 1);
        gate.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_archived_plate_denied_after_notification() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteWhitelistStore::open(dir.path().join("gate.db")).unwrap());
        let id = store.insert("XYZ999", "2024-01-01", "2024-12-31").unwrap();
        let gate = Gate::start(store.clone(), "2024-06-15").await;

        gate.request("XYZ999").await;
        gate.settle().await;
        assert_eq!(gate.commands(), 1);

        assert!(store.archive(&id).unwrap());
        gate.notify().await;
        gate.request("XYZ999").await;
        gate.settle().await;

        assert_eq!(gate.commands(), 1);
        gate.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_expired_plates_archived_in_bulk() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteWhitelistStore::open(dir.path().join("gate.db")).unwrap());
        store.insert("OLD001", "2024-01-01", "2024-05-31").unwrap();
        store.insert("NOW001", "2024-06-01", "2024-06-30").unwrap();
        let gate = Gate::start(store.clone(), "2024-06-15").await;

        assert_eq!(store.archive_expired(date("2024-06-15")).unwrap(), 1);
        gate.notify().await;
        gate.request("OLD001").await;
        gate.request("NOW001").await;
        gate.settle().await;

        assert_eq!(gate.publisher.attempts(), 1);
        assert_eq!(gate.commands(), 1);
        let snapshot = gate.runtime.cache().current_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.entries().next().unwrap().license_plate, "NOW001");
        gate.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_refresh_from_broker_topic_reloads() {
        let store = Arc::new(InMemoryWhitelistStore::new());
        let gate = Gate::start(store.clone(), "2024-06-15").await;

        store.push(StoredEntry::new("9", "BUS001", "2024-01-01", "2024-12-31"));
        gate.send_raw(
            topics::WHITELIST_REFRESH,
            br#"{"eventType":"refresh-licensePlateWhitelist"}"#.to_vec(),
        )
        .await;
        gate.request("BUS001").await;
        gate.settle().await;

        assert_eq!(gate.commands(), 1);
        gate.runtime.shutdown().await;
    }

    // =========================================================================
    // FAILURE HANDLING
    // =========================================================================

    #[tokio::test]
    async fn test_malformed_requests_do_not_stop_the_loop() {
        let gate = Gate::start(abc123_for_2024(), "2024-06-15").await;

        gate.send_raw(topics::ACCESS_REQUEST, b"not json".to_vec()).await;
        gate.send_raw(topics::ACCESS_REQUEST, vec![0xff, 0x00, 0xfe]).await;
        gate.send_raw(topics::ACCESS_REQUEST, br#"{"plate":"ABC123"}"#.to_vec())
            .await;
        gate.send_raw(topics::ACCESS_REQUEST, br#"{"licensePlate":"  "}"#.to_vec())
            .await;
        gate.send_raw(topics::ACCESS_REQUEST, br#"{"licensePlate":42}"#.to_vec())
            .await;
        gate.request("ABC123").await;
        gate.settle().await;

        assert_eq!(gate.publisher.attempts(), 1);
        assert_eq!(gate.commands(), 1);
        gate.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_whitelist() {
        let store = abc123_for_2024();
        let gate = Gate::start(store.clone(), "2024-06-15").await;
        let version = gate.runtime.cache().current_snapshot().version();

        store.set_failing(true);
        gate.notify().await;
        gate.request("ABC123").await;
        gate.settle().await;

        assert_eq!(gate.commands(), 1);
        assert_eq!(gate.runtime.cache().current_snapshot().version(), version);
        gate.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_publish_does_not_stop_the_loop() {
        let gate = Gate::start(abc123_for_2024(), "2024-06-15").await;

        gate.publisher.fail_with(Some(PublishError::Transport {
            topic: topics::RAMP_COMMAND.to_string(),
            reason: "request queue full".to_string(),
        }));
        gate.request("ABC123").await;
        gate.settle().await;
        gate.publisher.fail_with(None);
        gate.request("ABC123").await;
        gate.settle().await;

        assert_eq!(gate.publisher.attempts(), 2);
        assert_eq!(gate.commands(), 1);
        gate.runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_admin_test_topic_is_harmless() {
        let gate = Gate::start(abc123_for_2024(), "2024-06-15").await;

        gate.send_raw(topics::ADMIN_TEST, b"ping".to_vec()).await;
        gate.request("ABC123").await;
        gate.settle().await;

        assert_eq!(gate.commands(), 1);
        assert_eq!(gate.runtime.dispatcher().handler_failures(), 0);
        gate.runtime.shutdown().await;
    }
}
