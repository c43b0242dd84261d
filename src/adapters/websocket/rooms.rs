//! Subscription registry: live observers grouped by session.
//!
//! # Architecture
//!
//! ```text
//! Session: s1          Session: s2
//! ├── observer-a       ├── observer-d
//! ├── observer-b       └── observer-e
//! └── observer-c
//! ```
//!
//! When a message for `s1` is stored, only observers a, b, c receive it.
//! Each observer has its own bounded queue, so one broken or slow
//! connection is evicted on its own without touching the others.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::foundation::{ObserverId, SessionId};
use crate::ports::{
    DeliveryFailure, FanoutReport, Observer, ObserverEvent, ObserverRegistry, Subscription,
};

#[derive(Default)]
struct RegistryState {
    /// session_id → observers. A key exists only while it has observers.
    sessions: HashMap<SessionId, HashMap<ObserverId, Observer>>,

    /// observer_id → session_id for O(1) cleanup and the one-session rule.
    observer_sessions: HashMap<ObserverId, SessionId>,
}

impl RegistryState {
    fn remove_observer(&mut self, session_id: &SessionId, observer_id: &ObserverId) -> bool {
        let Some(observers) = self.sessions.get_mut(session_id) else {
            return false;
        };
        let removed = observers.remove(observer_id).is_some();
        if observers.is_empty() {
            self.sessions.remove(session_id);
            tracing::info!(session_id = %session_id, "Session removed (no active observers)");
        }
        if removed {
            self.observer_sessions.remove(observer_id);
        }
        removed
    }
}

/// Process-wide registry of live observers.
///
/// All operations run inside one exclusive section over the whole map.
/// Fan-out only enqueues (`try_send`) while holding it, so the section is
/// short and never waits on a socket. This also serializes fan-outs, which
/// keeps per-observer delivery order equal to publish order.
pub struct SubscriptionRegistry {
    state: Mutex<RegistryState>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Get all sessions with at least one observer (for monitoring/debugging).
    pub async fn active_sessions(&self) -> Vec<SessionId> {
        self.state.lock().await.sessions.keys().cloned().collect()
    }

    /// Get total count of observers across all sessions.
    pub async fn total_observers(&self) -> usize {
        self.state.lock().await.observer_sessions.len()
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObserverRegistry for SubscriptionRegistry {
    async fn subscribe(&self, session_id: &SessionId, observer: Observer) -> Subscription {
        let observer_id = observer.id();
        let mut state = self.state.lock().await;

        if let Some(previous) = state.observer_sessions.get(&observer_id).cloned() {
            if &previous != session_id {
                state.remove_observer(&previous, &observer_id);
            }
        }

        let observers = state.sessions.entry(session_id.clone()).or_default();
        observers.insert(observer_id, observer);
        let count = observers.len();
        state
            .observer_sessions
            .insert(observer_id, session_id.clone());

        tracing::debug!(
            session_id = %session_id,
            observer_id = %observer_id,
            observers = count,
            "Observer subscribed"
        );

        Subscription {
            session_id: session_id.clone(),
            observer_id,
        }
    }

    async fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut state = self.state.lock().await;
        let registered_here = state
            .observer_sessions
            .get(&subscription.observer_id)
            .is_some_and(|s| s == &subscription.session_id);
        if !registered_here {
            return false;
        }
        state.remove_observer(&subscription.session_id, &subscription.observer_id)
    }

    async fn fanout(&self, session_id: &SessionId, event: ObserverEvent) -> FanoutReport {
        let mut state = self.state.lock().await;
        let Some(observers) = state.sessions.get(session_id) else {
            return FanoutReport::default();
        };

        let mut report = FanoutReport::default();
        let mut failed: Vec<(ObserverId, DeliveryFailure)> = Vec::new();
        for (observer_id, observer) in observers {
            match observer.deliver(event.clone()) {
                Ok(()) => report.delivered += 1,
                Err(failure) => failed.push((*observer_id, failure)),
            }
        }

        for (observer_id, failure) in failed {
            match failure {
                DeliveryFailure::Disconnected => tracing::debug!(
                    session_id = %session_id,
                    observer_id = %observer_id,
                    "Evicting observer: {}",
                    failure
                ),
                DeliveryFailure::Lagging => tracing::warn!(
                    session_id = %session_id,
                    observer_id = %observer_id,
                    "Evicting observer: {}",
                    failure
                ),
            }
            if state.remove_observer(session_id, &observer_id) {
                report.evicted += 1;
            }
        }

        report
    }

    async fn observer_count(&self, session_id: &SessionId) -> usize {
        self.state
            .lock()
            .await
            .sessions
            .get(session_id)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}
