//! GetSessionMessagesHandler - Query handler for a session's message history.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::message::{MessageError, MessageView, Sender};
use crate::ports::{MessageStore, PageRequest};

/// Query for one page of a session's messages.
#[derive(Debug, Clone)]
pub struct GetSessionMessagesQuery {
    pub session_id: SessionId,
    pub page: PageRequest,
    pub sender: Option<Sender>,
}

/// Handler for listing messages by session.
pub struct GetSessionMessagesHandler {
    store: Arc<dyn MessageStore>,
}

impl GetSessionMessagesHandler {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: GetSessionMessagesQuery,
    ) -> Result<Vec<MessageView>, MessageError> {
        let messages = self
            .store
            .list_by_session(&query.session_id, query.page, query.sender)
            .await
            .map_err(|e| {
                tracing::error!(session_id = %query.session_id, "Failed to list messages: {}", e);
                MessageError::from(e)
            })?;

        Ok(messages.iter().map(MessageView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, MessageId, Timestamp};
    use crate::domain::message::{validate_and_enrich, Message, MessageDraft};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockMessageStore {
        messages: Vec<Message>,
        last_call: Mutex<Option<(SessionId, PageRequest, Option<Sender>)>>,
        fail: bool,
    }

    impl MockMessageStore {
        fn with(messages: Vec<Message>) -> Self {
            Self {
                messages,
                last_call: Mutex::new(None),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl MessageStore for MockMessageStore {
        async fn create(&self, message: &Message) -> Result<Message, DomainError> {
            Ok(message.clone())
        }

        async fn list_by_session(
            &self,
            session_id: &SessionId,
            page: PageRequest,
            sender: Option<Sender>,
        ) -> Result<Vec<Message>, DomainError> {
            *self.last_call.lock().unwrap() = Some((session_id.clone(), page, sender));
            if self.fail {
                return Err(DomainError::database("connection refused"));
            }
            Ok(self
                .messages
                .iter()
                .filter(|m| m.session_id() == session_id)
                .cloned()
                .collect())
        }

        async fn search(&self, _keyword: &str, _limit: u32) -> Result<Vec<Message>, DomainError> {
            Ok(Vec::new())
        }
    }

    fn message(id: &str, session: &str) -> Message {
        let draft = MessageDraft {
            message_id: MessageId::new(id).unwrap(),
            session_id: SessionId::new(session).unwrap(),
            content: "hello there".to_string(),
            sender: Sender::User,
            timestamp: Timestamp::now(),
        };
        Message::accept(draft, validate_and_enrich("hello there").unwrap())
    }

    #[tokio::test]
    async fn maps_stored_messages_to_views() {
        let store = Arc::new(MockMessageStore::with(vec![
            message("m1", "s1"),
            message("m2", "s2"),
        ]));
        let handler = GetSessionMessagesHandler::new(store);

        let views = handler
            .handle(GetSessionMessagesQuery {
                session_id: SessionId::new("s1").unwrap(),
                page: PageRequest::default(),
                sender: None,
            })
            .await
            .unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].message_id.as_str(), "m1");
        assert_eq!(views[0].metadata.word_count, 2);
    }

    #[tokio::test]
    async fn passes_page_and_sender_through() {
        let store = Arc::new(MockMessageStore::with(Vec::new()));
        let handler = GetSessionMessagesHandler::new(store.clone());
        let page = PageRequest::new(2, 1).unwrap();

        handler
            .handle(GetSessionMessagesQuery {
                session_id: SessionId::new("s1").unwrap(),
                page,
                sender: Some(Sender::System),
            })
            .await
            .unwrap();

        let (session_id, seen_page, sender) = store.last_call.lock().unwrap().clone().unwrap();
        assert_eq!(session_id.as_str(), "s1");
        assert_eq!(seen_page, page);
        assert_eq!(sender, Some(Sender::System));
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_storage_error() {
        let mut store = MockMessageStore::with(Vec::new());
        store.fail = true;
        let handler = GetSessionMessagesHandler::new(Arc::new(store));

        let result = handler
            .handle(GetSessionMessagesQuery {
                session_id: SessionId::new("s1").unwrap(),
                page: PageRequest::default(),
                sender: None,
            })
            .await;

        assert!(matches!(result, Err(MessageError::Storage(_))));
    }
}
