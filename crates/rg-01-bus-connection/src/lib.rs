//! # Bus Connection (rg-01)
//!
//! Owns the one persistent MQTT connection of the gate. No business logic:
//! inbound messages become `BusEvent`s on the dispatcher, outbound commands
//! are queued on the client.
//!
//! ## Failure Policy
//!
//! | Condition | Behaviour |
//! |-----------|-----------|
//! | broker unreachable / connection lost | logged as `ConnectionError`, retried after `reconnect_delay` |
//! | TLS material unreadable | logged, connection attempted without TLS |
//! | subscribe request rejected | logged, retried on next reconnect |
//! | publish rejected | `PublishError` to the caller, not retried |
//! | broker address unparseable | `AddressError`, fatal at startup |
//!
//! Ordering: messages are emitted in the order the event loop yields them,
//! which is the broker's per-connection delivery order.

pub mod config;
pub mod connection;
pub mod options;
pub mod tls;

pub use config::{
    AddressError, BrokerAddress, BrokerConfig, Credentials, TlsConfig, DEFAULT_PORT,
    DEFAULT_TLS_PORT,
};
pub use connection::{forward_to_dispatcher, on_message, BusConnection, MqttPublisher};
pub use options::{build_mqtt_options, TlsState};
pub use tls::{TlsError, TlsMaterial};
