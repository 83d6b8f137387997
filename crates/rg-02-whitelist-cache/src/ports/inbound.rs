//! # Inbound Ports (Driving Ports)

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{StoreError, WhitelistSnapshot};

use crate::domain::ReloadReport;

/// Public API of the Whitelist Cache.
#[async_trait]
pub trait WhitelistCacheApi: Send + Sync {
    /// Rebuild the snapshot from the store and swap it in.
    ///
    /// On error the previous snapshot stays in place.
    async fn reload(&self) -> Result<ReloadReport, StoreError>;

    /// The snapshot currently in effect. Never blocks on a reload.
    fn current_snapshot(&self) -> Arc<WhitelistSnapshot>;
}
