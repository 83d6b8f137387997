//! # Event Emitter
//!
//! Producer side of the dispatcher channel. Both the broker connection and
//! the whitelist CRUD layer push through an `EventEmitter`, so their events
//! share one ordering.

use shared_types::{topics, WhitelistChanged};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::dispatcher::DispatchError;
use crate::events::BusEvent;

/// Cloneable sending handle into the dispatch loop.
#[derive(Clone, Debug)]
pub struct EventEmitter {
    sender: mpsc::Sender<BusEvent>,
}

impl EventEmitter {
    pub(crate) fn new(sender: mpsc::Sender<BusEvent>) -> Self {
        Self { sender }
    }

    /// A detached emitter and its receiving end. Useful for producers that
    /// are tested without a dispatcher.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<BusEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }

    /// Queue an event, waiting for room if the channel is full.
    pub async fn emit(&self, event: BusEvent) -> Result<(), DispatchError> {
        debug!(topic = %event.topic, origin = event.origin.as_str(), "Event queued");
        self.sender
            .send(event)
            .await
            .map_err(|_| DispatchError::Closed)
    }

    /// Queue an event without waiting.
    pub fn try_emit(&self, event: BusEvent) -> Result<(), DispatchError> {
        self.sender.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::Full,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }

    /// Whether the dispatch loop has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Handle given to whatever mutates the whitelist store.
///
/// After a committed insert, update or delete, the mutator calls
/// `notify_whitelist_changed` and the refresh lands on the same timeline
/// as broker traffic.
#[derive(Clone, Debug)]
pub struct MutationNotifier {
    emitter: EventEmitter,
}

impl MutationNotifier {
    #[must_use]
    pub fn new(emitter: EventEmitter) -> Self {
        Self { emitter }
    }

    /// Raise a whitelist-changed event on the refresh topic.
    pub async fn notify_whitelist_changed(&self) -> Result<(), DispatchError> {
        let payload = serde_json::to_vec(&WhitelistChanged::default())
            .map_err(|e| DispatchError::Encode(e.to_string()))?;

        let result = self
            .emitter
            .emit(BusEvent::internal(topics::WHITELIST_REFRESH, payload))
            .await;

        if let Err(e) = &result {
            warn!(error = %e, "Whitelist change notification dropped");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventOrigin;

    #[tokio::test]
    async fn test_emit_preserves_order() {
        let (emitter, mut rx) = EventEmitter::channel(8);
        for i in 0..5u8 {
            emitter
                .emit(BusEvent::from_broker("t", vec![i]))
                .await
                .unwrap();
        }
        for i in 0..5u8 {
            assert_eq!(rx.recv().await.unwrap().payload, vec![i]);
        }
    }

    #[tokio::test]
    async fn test_try_emit_full_and_closed() {
        let (emitter, rx) = EventEmitter::channel(1);
        emitter.try_emit(BusEvent::internal("t", Vec::new())).unwrap();
        assert_eq!(
            emitter.try_emit(BusEvent::internal("t", Vec::new())),
            Err(DispatchError::Full)
        );

        drop(rx);
        assert!(emitter.is_closed());
        assert_eq!(
            emitter.emit(BusEvent::internal("t", Vec::new())).await,
            Err(DispatchError::Closed)
        );
    }

    #[tokio::test]
    async fn test_notifier_emits_refresh_event() {
        let (emitter, mut rx) = EventEmitter::channel(4);
        let notifier = MutationNotifier::new(emitter);

        notifier.notify_whitelist_changed().await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.topic, topics::WHITELIST_REFRESH);
        assert_eq!(event.origin, EventOrigin::Internal);

        let body: serde_json::Value = serde_json::from_slice(&event.payload).unwrap();
        assert_eq!(body["eventType"], "refresh-licensePlateWhitelist");
    }

    #[tokio::test]
    async fn test_notifier_reports_closed_dispatcher() {
        let (emitter, rx) = EventEmitter::channel(4);
        drop(rx);
        let notifier = MutationNotifier::new(emitter);
        assert_eq!(
            notifier.notify_whitelist_changed().await,
            Err(DispatchError::Closed)
        );
    }
}
