//! # MQTT Connection
//!
//! ```text
//!            ┌────────────── run() ───────────────┐
//! broker ──→ │ poll ─ ConnAck  → subscribe topics  │
//!            │      ─ Publish  → on_message → emit ├──→ dispatcher
//!            │      ─ Err      → log, wait, poll   │
//!            └─────────────────────────────────────┘
//! publisher() ──try_publish──→ client request queue ──→ broker
//! ```
//!
//! Reconnects are the transport's: polling again after an error opens a
//! fresh connection. The loop never exits on a transport error; it exits
//! on shutdown or when the dispatcher is gone.
//!
//! ## Backpressure
//!
//! Inbound messages are never dropped. When the dispatcher queue is full
//! the loop waits for room before polling again, which also holds back
//! keep-alives and queued publishes until the dispatcher catches up. Each
//! such wait is counted in `rg_dispatch_backpressure_total`.

use gate_telemetry::{BUS_MESSAGES_RECEIVED, CONNECTION_ERRORS, DISPATCH_BACKPRESSURE};
use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};
use shared_bus::{BusEvent, DispatchError, EventEmitter};
use shared_types::{ConnectionError, PublishError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::BrokerConfig;
use crate::options::{build_mqtt_options, TlsState};

/// Turn one inbound broker message into a dispatcher event.
pub fn on_message(topic: &str, payload: &[u8]) -> BusEvent {
    BusEvent::from_broker(topic, payload.to_vec())
}

/// Hand an inbound message to the dispatcher, waiting for room if the
/// queue is full. Fails only when the dispatcher is gone.
pub async fn forward_to_dispatcher(
    emitter: &EventEmitter,
    event: BusEvent,
) -> Result<(), DispatchError> {
    match emitter.try_emit(event.clone()) {
        Err(DispatchError::Full) => {
            DISPATCH_BACKPRESSURE.inc();
            warn!(topic = %event.topic, "[rg-01] Dispatcher queue full, holding broker loop");
            emitter.emit(event).await
        }
        other => other,
    }
}

/// The single broker connection of the process.
pub struct BusConnection {
    client: AsyncClient,
    eventloop: EventLoop,
    config: BrokerConfig,
    tls: TlsState,
}

impl BusConnection {
    /// Prepare the connection. Network I/O starts with `run`; a broker that
    /// is down now is retried there.
    pub fn connect(config: BrokerConfig) -> Self {
        let (options, tls) = build_mqtt_options(&config);
        let (client, eventloop) = AsyncClient::new(options, config.request_capacity.max(1));

        info!(
            broker = %config.address,
            client_id = %config.client_id,
            tls = ?tls,
            topics = ?config.topics,
            "[rg-01] MQTT connection configured"
        );

        Self {
            client,
            eventloop,
            config,
            tls,
        }
    }

    /// Handle for outbound messages. Cheap to clone.
    #[must_use]
    pub fn publisher(&self) -> MqttPublisher {
        MqttPublisher {
            client: self.client.clone(),
        }
    }

    #[must_use]
    pub fn tls_state(&self) -> &TlsState {
        &self.tls
    }

    /// Drive the connection until `shutdown` flips or the dispatcher closes.
    pub async fn run(mut self, emitter: EventEmitter, mut shutdown: watch::Receiver<bool>) {
        info!("[rg-01] Connecting to {}", self.config.address);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    info!("[rg-01] Shutdown signal received");
                    if let Err(e) = self.client.try_disconnect() {
                        debug!(error = %e, "[rg-01] Disconnect not sent");
                    }
                    break;
                }
                polled = self.eventloop.poll() => match polled {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("[rg-01] Connected to {}", self.config.address);
                        self.subscribe_all();
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        BUS_MESSAGES_RECEIVED.inc();
                        let event = on_message(&publish.topic, &publish.payload);
                        if forward_to_dispatcher(&emitter, event).await.is_err() {
                            warn!("[rg-01] Dispatcher closed, stopping connection loop");
                            break;
                        }
                    }
                    Ok(Event::Incoming(Packet::SubAck(ack))) => {
                        debug!(pkid = ack.pkid, "[rg-01] Subscription acknowledged");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        CONNECTION_ERRORS.inc();
                        let err = ConnectionError::Transport(e.to_string());
                        warn!(error = %err, "[rg-01] MQTT client error; reconnecting");
                        tokio::select! {
                            _ = shutdown.changed() => {
                                info!("[rg-01] Shutdown signal received");
                                break;
                            }
                            _ = tokio::time::sleep(self.config.reconnect_delay) => {}
                        }
                    }
                },
            }
        }

        info!("[rg-01] Connection loop stopped");
    }

    fn subscribe_all(&self) {
        for topic in &self.config.topics {
            match self.client.try_subscribe(topic.as_str(), QoS::AtMostOnce) {
                Ok(()) => info!("[rg-01] Subscribed to {}", topic),
                Err(e) => {
                    CONNECTION_ERRORS.inc();
                    let err = ConnectionError::Subscribe {
                        topic: topic.clone(),
                        reason: e.to_string(),
                    };
                    warn!(error = %err, "[rg-01] Subscribe failed");
                }
            }
        }
    }
}

/// Outbound side of the connection.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    /// Queue a message for the broker without waiting. Fails when the
    /// request queue is full or the connection loop is gone; there is no
    /// retry.
    pub fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), PublishError> {
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload)
            .map_err(|e| PublishError::Transport {
                topic: topic.to_string(),
                reason: e.to_string(),
            })?;
        debug!("[rg-01] Queued publish to {}", topic);
        Ok(())
    }
}
