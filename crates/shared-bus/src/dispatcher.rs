//! # Event Dispatcher
//!
//! Owns the receiving end of the event channel and the handler list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use gate_telemetry::{DISPATCHER_EVENTS, HANDLER_FAILURES};
use parking_lot::{Mutex, RwLock};
use shared_types::{ErrorKind, GateError};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::emitter::EventEmitter;
use crate::events::{BusEvent, EventFilter};
use crate::DEFAULT_CHANNEL_CAPACITY;

/// Errors from dispatcher operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The dispatch loop is gone; nothing will consume the event.
    #[error("Event dispatcher closed")]
    Closed,

    /// Non-blocking emit found the channel full.
    #[error("Event channel full")]
    Full,

    /// `run` was called while another loop already owns the receiver.
    #[error("Dispatch loop already running")]
    AlreadyRunning,

    /// An internal payload could not be encoded.
    #[error("Failed to encode event payload: {0}")]
    Encode(String),
}

/// A consumer of dispatched events.
///
/// `handle` returns the typed error of whatever went wrong; the dispatcher
/// logs it and moves on. A handler error never stops the loop.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Topics this handler wants.
    fn filter(&self) -> EventFilter;

    /// Process one event.
    async fn handle(&self, event: &BusEvent) -> Result<(), GateError>;
}

struct Registration {
    filter: EventFilter,
    handler: Arc<dyn EventHandler>,
}

/// Single-consumer dispatcher.
///
/// Producers hold `EventEmitter`s; the loop started by `run` receives events
/// in channel order and awaits each matching handler in registration order.
pub struct EventDispatcher {
    sender: mpsc::Sender<BusEvent>,
    receiver: Mutex<Option<mpsc::Receiver<BusEvent>>>,
    handlers: RwLock<Vec<Registration>>,
    events_dispatched: AtomicU64,
    handler_failures: AtomicU64,
    capacity: usize,
}

impl EventDispatcher {
    /// Create a new dispatcher with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new dispatcher with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            handlers: RwLock::new(Vec::new()),
            events_dispatched: AtomicU64::new(0),
            handler_failures: AtomicU64::new(0),
            capacity,
        }
    }

    /// Register a handler. Handlers run in registration order.
    pub fn on(&self, handler: Arc<dyn EventHandler>) {
        let filter = handler.filter();
        debug!(handler = handler.name(), topics = ?filter.topics, "Handler registered");
        self.handlers.write().push(Registration { filter, handler });
    }

    /// A cloneable producer handle feeding this dispatcher.
    #[must_use]
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter::new(self.sender.clone())
    }

    /// Inject an internal event as if it had arrived from the bus.
    pub async fn emit(
        &self,
        topic: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Result<(), DispatchError> {
        self.emitter().emit(BusEvent::internal(topic, payload)).await
    }

    /// Deliver one event to every matching handler, sequentially.
    ///
    /// Returns the number of handlers the event was delivered to.
    pub async fn dispatch(&self, event: &BusEvent) -> usize {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed);
        DISPATCHER_EVENTS
            .with_label_values(&[event.origin.as_str()])
            .inc();

        // Clone the targets out so no lock is held across an await.
        let targets: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .iter()
            .filter(|r| r.filter.matches(event))
            .map(|r| Arc::clone(&r.handler))
            .collect();

        if targets.is_empty() {
            debug!(topic = %event.topic, origin = event.origin.as_str(), "No handler for topic");
            return 0;
        }

        for handler in &targets {
            if let Err(e) = handler.handle(event).await {
                self.handler_failures.fetch_add(1, Ordering::Relaxed);
                HANDLER_FAILURES
                    .with_label_values(&[e.kind().as_str()])
                    .inc();

                match e.kind() {
                    ErrorKind::MalformedEvent => warn!(
                        handler = handler.name(),
                        topic = %event.topic,
                        error = %e,
                        "Discarded malformed event"
                    ),
                    _ => error!(
                        handler = handler.name(),
                        topic = %event.topic,
                        kind = e.kind().as_str(),
                        error = %e,
                        "Event handler failed"
                    ),
                }
            }
        }

        targets.len()
    }

    /// Run the dispatch loop until `shutdown` flips or every producer is
    /// gone. Only one loop may own the receiver.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), DispatchError> {
        let mut receiver = self
            .receiver
            .lock()
            .take()
            .ok_or(DispatchError::AlreadyRunning)?;

        info!(
            "[dispatcher] Started with {} handler(s)",
            self.handler_count()
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    info!("[dispatcher] Shutdown signal received");
                    break;
                }
                next = receiver.recv() => match next {
                    Some(event) => {
                        self.dispatch(&event).await;
                    }
                    None => {
                        warn!("[dispatcher] Event channel closed, stopping");
                        break;
                    }
                },
            }
        }

        Ok(())
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Total events passed to `dispatch`.
    #[must_use]
    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched.load(Ordering::Relaxed)
    }

    /// Total handler invocations that returned an error.
    #[must_use]
    pub fn handler_failures(&self) -> u64 {
        self.handler_failures.load(Ordering::Relaxed)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
