//! Whitelist cache exposed to the decision engine.

use std::sync::Arc;

use rg_02_whitelist_cache::WhitelistCache;
use rg_03_access_decision::WhitelistView;
use shared_types::WhitelistSnapshot;

pub struct CacheView {
    cache: Arc<WhitelistCache>,
}

impl CacheView {
    pub fn new(cache: Arc<WhitelistCache>) -> Self {
        Self { cache }
    }
}

impl WhitelistView for CacheView {
    fn current_snapshot(&self) -> Arc<WhitelistSnapshot> {
        self.cache.current_snapshot()
    }
}
