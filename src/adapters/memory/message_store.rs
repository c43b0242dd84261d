//! In-memory implementation of MessageStore.
//!
//! Keeps messages in insertion order in a single vector, with an id index
//! for the uniqueness check. Used by tests and by the `memory` store
//! backend; contents are lost on restart.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, MessageId, SessionId};
use crate::domain::message::{Message, Sender};
use crate::ports::{MessageStore, PageRequest};

#[derive(Default)]
pub struct InMemoryMessageStore {
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    messages: Vec<Message>,
    ids: HashSet<MessageId>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages.
    pub async fn len(&self) -> usize {
        self.state.read().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.messages.is_empty()
    }

    /// Snapshot of all messages in insertion order.
    pub async fn all(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create(&self, message: &Message) -> Result<Message, DomainError> {
        let mut state = self.state.write().await;
        if !state.ids.insert(message.id().clone()) {
            return Err(DomainError::new(
                ErrorCode::DuplicateId,
                format!("Message already exists: {}", message.id()),
            )
            .with_detail("message_id", message.id().as_str()));
        }
        state.messages.push(message.clone());
        Ok(message.clone())
    }

    async fn list_by_session(
        &self,
        session_id: &SessionId,
        page: PageRequest,
        sender: Option<Sender>,
    ) -> Result<Vec<Message>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .filter(|m| m.session_id() == session_id)
            .filter(|m| sender.map_or(true, |s| m.sender() == s))
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn search(&self, keyword: &str, limit: u32) -> Result<Vec<Message>, DomainError> {
        let needle = keyword.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .filter(|m| m.content().to_lowercase().contains(&needle))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
