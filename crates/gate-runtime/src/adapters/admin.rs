//! `admin/test` is reserved. Messages are acknowledged in the log and
//! otherwise ignored.

use async_trait::async_trait;
use shared_bus::{BusEvent, EventFilter, EventHandler};
use shared_types::{topics, GateError};
use tracing::debug;

#[derive(Debug, Default)]
pub struct AdminTestHandler;

#[async_trait]
impl EventHandler for AdminTestHandler {
    fn name(&self) -> &'static str {
        "admin-test"
    }

    fn filter(&self) -> EventFilter {
        EventFilter::topic(topics::ADMIN_TEST)
    }

    async fn handle(&self, event: &BusEvent) -> Result<(), GateError> {
        debug!(payload = %event.payload_text(), "[runtime] admin/test message ignored");
        Ok(())
    }
}
