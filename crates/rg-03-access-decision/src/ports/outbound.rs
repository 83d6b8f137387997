//! # Outbound Ports (Driven Ports)
//!
//! What the engine needs from the rest of the gate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared_types::{PublishError, WhitelistSnapshot};

/// Read access to the whitelist snapshot in effect.
pub trait WhitelistView: Send + Sync {
    fn current_snapshot(&self) -> Arc<WhitelistSnapshot>;
}

/// Outbound publish to the bus. Fire and forget: `Ok` means the transport
/// accepted the message, not that the actuator received it.
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError>;
}

/// Source of "today" in the gate's local calendar.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}
