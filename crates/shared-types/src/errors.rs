//! # Error Types
//!
//! The runtime error taxonomy. None of these terminate the process; each
//! names the recovery the component applies.
//!
//! | Error | Recovery |
//! |-------|----------|
//! | `ConnectionError` | transport reconnects; logged |
//! | `MalformedEventError` | event denied/discarded; logged |
//! | `StoreError` | previous snapshot retained; logged |
//! | `PublishError` | decision stands; logged, not retried |

use thiserror::Error;

/// Broker unreachable or connection dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The transport reported a failure while polling.
    #[error("Broker connection failed: {0}")]
    Transport(String),

    /// A subscribe request could not be queued.
    #[error("Subscribe to {topic} failed: {reason}")]
    Subscribe { topic: String, reason: String },
}

/// Inbound payload that cannot be turned into a typed event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEventError {
    /// Not UTF-8 JSON, or a required field is missing or mistyped.
    #[error("Malformed payload: {0}")]
    Decode(String),

    /// `licensePlate` present but blank.
    #[error("Malformed payload: licensePlate is empty")]
    EmptyPlate,
}

/// The persistent store could not produce the whitelist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Database could not be opened or queried.
    #[error("Database error: {0}")]
    Database(String),

    /// The blocking query task did not complete.
    #[error("Store task failed: {0}")]
    Task(String),

    /// The store is deliberately unavailable (test doubles, maintenance).
    #[error("Store unavailable")]
    Unavailable,
}

/// An outbound publish was not accepted by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// Payload could not be encoded.
    #[error("Failed to encode payload for {topic}: {reason}")]
    Encode { topic: String, reason: String },

    /// Client request queue rejected the message.
    #[error("Failed to publish to {topic}: {reason}")]
    Transport { topic: String, reason: String },
}

/// Category of a `GateError`, for assertions and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    MalformedEvent,
    Store,
    Publish,
}

impl ErrorKind {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::MalformedEvent => "malformed_event",
            Self::Store => "store",
            Self::Publish => "publish",
        }
    }
}

/// Any runtime error raised by a gate component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    MalformedEvent(#[from] MalformedEventError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl GateError {
    /// The taxonomy bucket this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_) => ErrorKind::Connection,
            Self::MalformedEvent(_) => ErrorKind::MalformedEvent,
            Self::Store(_) => ErrorKind::Store,
            Self::Publish(_) => ErrorKind::Publish,
        }
    }
}
