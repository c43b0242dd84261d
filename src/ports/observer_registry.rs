//! Observer registry port - live subscriptions keyed by session.
//!
//! An observer is one live connection that wants every message published to
//! one session from now on. The registry owns the mapping
//! `session_id -> observers`, creating an entry on first subscribe and
//! removing it the moment its last observer leaves.
//!
//! Delivery is best-effort per observer. A failed delivery never reaches the
//! publisher: the registry evicts that observer and carries on with the rest.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::foundation::{ObserverId, SessionId};
use crate::domain::message::MessageView;

/// Event pushed to observers of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverEvent {
    /// A message for the session was stored.
    NewMessage(Arc<MessageView>),
}

/// Why one delivery failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The observer's channel is closed (connection gone).
    Disconnected,
    /// The observer's outbound queue is full.
    Lagging,
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryFailure::Disconnected => f.write_str("observer disconnected"),
            DeliveryFailure::Lagging => f.write_str("observer queue full"),
        }
    }
}

/// Sending half of one observer connection.
///
/// The connection task keeps the matching receiver and forwards events to
/// its transport. Dropping the receiver is how a connection signals that it
/// is gone, even before it gets to unsubscribe.
#[derive(Debug, Clone)]
pub struct Observer {
    id: ObserverId,
    outbox: mpsc::Sender<ObserverEvent>,
}

impl Observer {
    /// Creates an observer with a bounded outbound queue.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ObserverEvent>) {
        let (outbox, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                id: ObserverId::new(),
                outbox,
            },
            rx,
        )
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Enqueues an event without waiting.
    pub fn deliver(&self, event: ObserverEvent) -> Result<(), DeliveryFailure> {
        self.outbox.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryFailure::Lagging,
            mpsc::error::TrySendError::Closed(_) => DeliveryFailure::Disconnected,
        })
    }

    /// True once the receiving half has been dropped.
    pub fn is_closed(&self) -> bool {
        self.outbox.is_closed()
    }
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub session_id: SessionId,
    pub observer_id: ObserverId,
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Observers the event was enqueued for.
    pub delivered: usize,
    /// Observers removed because delivery failed.
    pub evicted: usize,
}

/// Port for the process-wide subscription registry.
///
/// Implementations must serialize mutations of a session's observer set so
/// that a fan-out never sees a half-applied subscribe or unsubscribe, and
/// must serialize fan-outs per session so that sequential publishes reach
/// each observer in publish order.
#[async_trait]
pub trait ObserverRegistry: Send + Sync {
    /// Register `observer` under `session_id`.
    ///
    /// Subscribing the same observer twice does not duplicate delivery. An
    /// observer already registered under another session is moved.
    async fn subscribe(&self, session_id: &SessionId, observer: Observer) -> Subscription;

    /// Remove the subscription. Returns false if it was already gone
    /// (for example after an eviction).
    async fn unsubscribe(&self, subscription: &Subscription) -> bool;

    /// Deliver `event` to every observer registered under `session_id` now.
    async fn fanout(&self, session_id: &SessionId, event: ObserverEvent) -> FanoutReport;

    /// Number of observers currently registered under `session_id`.
    async fn observer_count(&self, session_id: &SessionId) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{MessageId, Timestamp};
    use crate::domain::message::{MessageMetadata, Sender};

    fn event() -> ObserverEvent {
        ObserverEvent::NewMessage(Arc::new(MessageView {
            message_id: MessageId::new("m1").unwrap(),
            session_id: SessionId::new("s1").unwrap(),
            content: "hi".to_string(),
            timestamp: Timestamp::now(),
            sender: Sender::User,
            metadata: MessageMetadata {
                word_count: 1,
                character_count: 2,
                processed_at: Timestamp::now(),
            },
        }))
    }

    // Trait object safety test
    #[test]
    fn observer_registry_is_object_safe() {
        fn _accepts_dyn(_registry: &dyn ObserverRegistry) {}
    }

    #[tokio::test]
    async fn deliver_enqueues_event() {
        let (observer, mut rx) = Observer::channel(4);
        let sent = event();
        observer.deliver(sent.clone()).unwrap();
        assert_eq!(rx.recv().await, Some(sent));
    }

    #[test]
    fn deliver_to_full_queue_is_lagging() {
        let (observer, _rx) = Observer::channel(1);
        observer.deliver(event()).unwrap();
        assert_eq!(observer.deliver(event()), Err(DeliveryFailure::Lagging));
    }

    #[test]
    fn deliver_to_dropped_receiver_is_disconnected() {
        let (observer, rx) = Observer::channel(1);
        drop(rx);
        assert!(observer.is_closed());
        assert_eq!(observer.deliver(event()), Err(DeliveryFailure::Disconnected));
    }

    #[test]
    fn observers_get_distinct_ids() {
        let (a, _ra) = Observer::channel(1);
        let (b, _rb) = Observer::channel(1);
        assert_ne!(a.id(), b.id());
    }
}
