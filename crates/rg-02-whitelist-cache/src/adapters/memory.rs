//! In-memory whitelist store.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{StoreError, StoredEntry};

use crate::ports::WhitelistStore;

/// Rows held in memory. `set_failing(true)` makes every fetch fail with
/// `StoreError::Unavailable` until switched back.
#[derive(Default)]
pub struct InMemoryWhitelistStore {
    rows: RwLock<Vec<StoredEntry>>,
    failing: AtomicBool,
    fetches: AtomicU64,
}

impl InMemoryWhitelistStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rows(rows: Vec<StoredEntry>) -> Self {
        Self {
            rows: RwLock::new(rows),
            ..Self::default()
        }
    }

    /// Replace all rows.
    pub fn set_rows(&self, rows: Vec<StoredEntry>) {
        *self.rows.write() = rows;
    }

    pub fn push(&self, row: StoredEntry) {
        self.rows.write().push(row);
    }

    /// Remove the row with `id`. Returns whether one was removed.
    pub fn remove(&self, id: &str) -> bool {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        rows.len() != before
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of fetch calls, failed ones included.
    #[must_use]
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WhitelistStore for InMemoryWhitelistStore {
    async fn fetch_all_whitelist_entries(&self) -> Result<Vec<StoredEntry>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(self.rows.read().clone())
    }
}
