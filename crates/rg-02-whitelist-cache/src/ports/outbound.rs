//! # Outbound Ports (Driven Ports)
//!
//! The persistent store the cache rehydrates from.

use async_trait::async_trait;
use shared_types::{StoredEntry, StoreError};

/// Read side of the whitelist store.
///
/// Implementations return every active entry. Archived entries are not part
/// of the whitelist and must not be returned.
#[async_trait]
pub trait WhitelistStore: Send + Sync {
    /// Fetch all active whitelist rows as stored.
    async fn fetch_all_whitelist_entries(&self) -> Result<Vec<StoredEntry>, StoreError>;
}
