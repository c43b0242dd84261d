//! SearchMessagesHandler - keyword search over message content.

use std::sync::Arc;

use crate::domain::message::{MessageError, MessageView};
use crate::ports::{MessageStore, DEFAULT_PAGE_LIMIT, MAX_SEARCH_LIMIT};

/// Query for a case-insensitive substring search.
#[derive(Debug, Clone)]
pub struct SearchMessagesQuery {
    pub query: String,
    /// Defaults to `DEFAULT_PAGE_LIMIT`; values above `MAX_SEARCH_LIMIT` are capped.
    pub limit: Option<u32>,
}

pub struct SearchMessagesHandler {
    store: Arc<dyn MessageStore>,
}

impl SearchMessagesHandler {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: SearchMessagesQuery) -> Result<Vec<MessageView>, MessageError> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_SEARCH_LIMIT);

        let messages = self.store.search(&query.query, limit).await.map_err(|e| {
            tracing::error!(query = %query.query, "Failed to search messages: {}", e);
            MessageError::from(e)
        })?;

        Ok(messages.iter().map(MessageView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, SessionId};
    use crate::domain::message::{Message, Sender};
    use crate::ports::PageRequest;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockMessageStore {
        searches: Mutex<Vec<(String, u32)>>,
    }

    #[async_trait]
    impl MessageStore for MockMessageStore {
        async fn create(&self, message: &Message) -> Result<Message, DomainError> {
            Ok(message.clone())
        }

        async fn list_by_session(
            &self,
            _session_id: &SessionId,
            _page: PageRequest,
            _sender: Option<Sender>,
        ) -> Result<Vec<Message>, DomainError> {
            Ok(Vec::new())
        }

        async fn search(&self, keyword: &str, limit: u32) -> Result<Vec<Message>, DomainError> {
            self.searches
                .lock()
                .unwrap()
                .push((keyword.to_string(), limit));
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn applies_default_limit() {
        let store = Arc::new(MockMessageStore::default());
        let handler = SearchMessagesHandler::new(store.clone());

        handler
            .handle(SearchMessagesQuery {
                query: "hola".to_string(),
                limit: None,
            })
            .await
            .unwrap();

        assert_eq!(
            store.searches.lock().unwrap().clone(),
            vec![("hola".to_string(), DEFAULT_PAGE_LIMIT)]
        );
    }

    #[tokio::test]
    async fn passes_explicit_limit_through() {
        let store = Arc::new(MockMessageStore::default());
        let handler = SearchMessagesHandler::new(store.clone());

        handler
            .handle(SearchMessagesQuery {
                query: "hola".to_string(),
                limit: Some(250),
            })
            .await
            .unwrap();

        assert_eq!(
            store.searches.lock().unwrap().clone(),
            vec![("hola".to_string(), 250)]
        );
    }

    #[tokio::test]
    async fn caps_oversized_limit_instead_of_rejecting() {
        let store = Arc::new(MockMessageStore::default());
        let handler = SearchMessagesHandler::new(store.clone());

        let result = handler
            .handle(SearchMessagesQuery {
                query: "hola".to_string(),
                limit: Some(u32::MAX),
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(
            store.searches.lock().unwrap().clone(),
            vec![("hola".to_string(), MAX_SEARCH_LIMIT)]
        );
    }
}
