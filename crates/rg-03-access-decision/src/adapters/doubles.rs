//! Deterministic stand-ins for the engine's ports.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{PublishError, WhitelistSnapshot};

use crate::ports::{CommandPublisher, WhitelistView};

/// A whitelist view whose snapshot is replaced by hand.
#[derive(Debug, Default)]
pub struct StaticWhitelist {
    snapshot: RwLock<Arc<WhitelistSnapshot>>,
}

impl StaticWhitelist {
    #[must_use]
    pub fn new(snapshot: WhitelistSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn replace(&self, snapshot: WhitelistSnapshot) {
        *self.snapshot.write() = Arc::new(snapshot);
    }
}

impl WhitelistView for StaticWhitelist {
    fn current_snapshot(&self) -> Arc<WhitelistSnapshot> {
        self.snapshot.read().clone()
    }
}

/// Records every publish. `fail_with` makes publishes fail after being
/// recorded as attempts.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, Vec<u8>)>>,
    attempts: Mutex<usize>,
    fail_with: Mutex<Option<PublishError>>,
}

impl RecordingPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, error: Option<PublishError>) {
        *self.fail_with.lock() = error;
    }

    /// Successful publishes, in order.
    #[must_use]
    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.published.lock().clone()
    }

    #[must_use]
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait]
impl CommandPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        *self.attempts.lock() += 1;
        if let Some(e) = self.fail_with.lock().clone() {
            return Err(e);
        }
        self.published.lock().push((topic.to_string(), payload));
        Ok(())
    }
}
