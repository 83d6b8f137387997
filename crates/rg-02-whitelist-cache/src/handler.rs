//! Refresh trigger: every event on the whitelist-refresh topic reloads the
//! cache. The payload is a marker and is not inspected.

use std::sync::Arc;

use async_trait::async_trait;
use shared_bus::{BusEvent, EventFilter, EventHandler};
use shared_types::{topics, GateError};
use tracing::debug;

use crate::service::WhitelistCache;

pub struct WhitelistRefreshHandler {
    cache: Arc<WhitelistCache>,
}

impl WhitelistRefreshHandler {
    pub fn new(cache: Arc<WhitelistCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl EventHandler for WhitelistRefreshHandler {
    fn name(&self) -> &'static str {
        "whitelist-refresh"
    }

    fn filter(&self) -> EventFilter {
        EventFilter::topic(topics::WHITELIST_REFRESH)
    }

    async fn handle(&self, event: &BusEvent) -> Result<(), GateError> {
        debug!(
            origin = event.origin.as_str(),
            "[rg-02] Whitelist change notified, reloading"
        );
        self.cache.reload().await?;
        Ok(())
    }
}
