//! SessionGateway - single entry point for the relay's use cases.
//!
//! Write path: [`SessionGateway::submit_message`] runs the acceptance
//! pipeline and fans the stored message out. Read path: listing and search
//! go straight to the message store. Observer lifecycle:
//! [`SessionGateway::connect_observer`] / [`SessionGateway::disconnect_observer`]
//! wrap the registry for the transport adapters.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::foundation::SessionId;
use crate::domain::message::{ContentPolicy, MessageError, MessageView};
use crate::ports::{MessageStore, Observer, ObserverEvent, ObserverRegistry, Subscription};

use super::handlers::message::{
    GetSessionMessagesHandler, GetSessionMessagesQuery, SearchMessagesHandler,
    SearchMessagesQuery, SubmitMessageCommand, SubmitMessageHandler,
};

/// A live observer as seen by its connection task.
pub struct ObserverConnection {
    pub subscription: Subscription,
    /// Closes when the registry evicts the observer.
    pub events: mpsc::Receiver<ObserverEvent>,
}

pub struct SessionGateway {
    submit_handler: SubmitMessageHandler,
    list_handler: GetSessionMessagesHandler,
    search_handler: SearchMessagesHandler,
    registry: Arc<dyn ObserverRegistry>,
    observer_buffer: usize,
}

impl SessionGateway {
    pub fn new(
        store: Arc<dyn MessageStore>,
        registry: Arc<dyn ObserverRegistry>,
        policy: Arc<ContentPolicy>,
        observer_buffer: usize,
    ) -> Self {
        Self {
            submit_handler: SubmitMessageHandler::new(store.clone(), registry.clone(), policy),
            list_handler: GetSessionMessagesHandler::new(store.clone()),
            search_handler: SearchMessagesHandler::new(store),
            registry,
            observer_buffer,
        }
    }

    pub async fn submit_message(
        &self,
        cmd: SubmitMessageCommand,
    ) -> Result<MessageView, MessageError> {
        self.submit_handler.handle(cmd).await
    }

    pub async fn get_messages(
        &self,
        query: GetSessionMessagesQuery,
    ) -> Result<Vec<MessageView>, MessageError> {
        self.list_handler.handle(query).await
    }

    pub async fn search_messages(
        &self,
        query: SearchMessagesQuery,
    ) -> Result<Vec<MessageView>, MessageError> {
        self.search_handler.handle(query).await
    }

    /// Registers a new observer for `session_id`.
    pub async fn connect_observer(&self, session_id: &SessionId) -> ObserverConnection {
        let (observer, events) = Observer::channel(self.observer_buffer);
        let subscription = self.registry.subscribe(session_id, observer).await;
        tracing::info!(
            session_id = %session_id,
            observer_id = %subscription.observer_id,
            "Observer connected"
        );
        ObserverConnection {
            subscription,
            events,
        }
    }

    /// Removes the observer. Safe to call after an eviction.
    pub async fn disconnect_observer(&self, subscription: &Subscription) {
        let removed = self.registry.unsubscribe(subscription).await;
        tracing::info!(
            session_id = %subscription.session_id,
            observer_id = %subscription.observer_id,
            was_registered = removed,
            "Observer disconnected"
        );
    }
}
