//! Access-request consumer on the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use shared_bus::{BusEvent, EventFilter, EventHandler};
use shared_types::{topics, GateError};

use crate::service::AccessDecisionEngine;

/// Feeds `alpr/ramp/req` payloads to the engine.
///
/// Always returns `Ok`: a malformed request is a denial and a failed publish
/// does not undo a grant, and the engine has already logged both.
pub struct AccessRequestHandler {
    engine: Arc<AccessDecisionEngine>,
}

impl AccessRequestHandler {
    pub fn new(engine: Arc<AccessDecisionEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl EventHandler for AccessRequestHandler {
    fn name(&self) -> &'static str {
        "access-request"
    }

    fn filter(&self) -> EventFilter {
        EventFilter::topic(topics::ACCESS_REQUEST)
    }

    async fn handle(&self, event: &BusEvent) -> Result<(), GateError> {
        self.engine.evaluate(&event.payload).await;
        Ok(())
    }
}
