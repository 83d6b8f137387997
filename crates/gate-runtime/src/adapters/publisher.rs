//! Broker publisher exposed to the decision engine.

use async_trait::async_trait;
use rg_01_bus_connection::MqttPublisher;
use rg_03_access_decision::CommandPublisher;
use shared_types::PublishError;

pub struct MqttCommandPublisher {
    inner: MqttPublisher,
}

impl MqttCommandPublisher {
    pub fn new(inner: MqttPublisher) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CommandPublisher for MqttCommandPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        self.inner.publish(topic, payload)
    }
}
