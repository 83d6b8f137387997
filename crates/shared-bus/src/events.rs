//! # Bus Events
//!
//! The uniform event flowing through the dispatcher, whatever its origin.

use chrono::{DateTime, Utc};

/// Where an event entered the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    /// Delivered by the message broker.
    Broker,
    /// Raised inside the process (e.g. a whitelist mutation notification).
    Internal,
}

impl EventOrigin {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Broker => "broker",
            Self::Internal => "internal",
        }
    }
}

/// A topic-addressed message on the internal timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusEvent {
    /// Exact topic name.
    pub topic: String,
    /// Raw payload bytes; decoding is the handler's job.
    pub payload: Vec<u8>,
    pub origin: EventOrigin,
    /// When the event entered the process.
    pub received_at: DateTime<Utc>,
}

impl BusEvent {
    /// An event that arrived from the broker.
    pub fn from_broker(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self::new(topic, payload, EventOrigin::Broker)
    }

    /// An event raised inside the process.
    pub fn internal(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self::new(topic, payload, EventOrigin::Internal)
    }

    fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>, origin: EventOrigin) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            origin,
            received_at: Utc::now(),
        }
    }

    /// Payload as text, lossy, for logging.
    #[must_use]
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Topic filter for handler registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for a single topic.
    pub fn topic(topic: impl Into<String>) -> Self {
        Self {
            topics: vec![topic.into()],
        }
    }

    /// Create a filter for several topics.
    pub fn topics<I, T>(topics: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if an event matches this filter. No wildcards.
    #[must_use]
    pub fn matches(&self, event: &BusEvent) -> bool {
        self.topics.is_empty() || self.topics.iter().any(|t| *t == event.topic)
    }
}
