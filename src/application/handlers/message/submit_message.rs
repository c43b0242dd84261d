//! SubmitMessageHandler - the message acceptance pipeline.
//!
//! validate/enrich → store → fan out. A rejected or unstored message never
//! reaches observers; a stored one always triggers a fan-out, whose outcome
//! never changes the result returned to the caller.

use std::sync::Arc;

use crate::domain::foundation::{MessageId, SessionId, Timestamp};
use crate::domain::message::{
    ContentPolicy, Message, MessageDraft, MessageError, MessageView, Sender,
};
use crate::ports::{MessageStore, ObserverEvent, ObserverRegistry};

/// Command to submit a new message.
#[derive(Debug, Clone)]
pub struct SubmitMessageCommand {
    pub message_id: MessageId,
    pub session_id: SessionId,
    pub content: String,
    pub sender: Sender,
    pub timestamp: Timestamp,
}

impl From<SubmitMessageCommand> for MessageDraft {
    fn from(cmd: SubmitMessageCommand) -> Self {
        MessageDraft {
            message_id: cmd.message_id,
            session_id: cmd.session_id,
            content: cmd.content,
            sender: cmd.sender,
            timestamp: cmd.timestamp,
        }
    }
}

/// Handler for message submission.
pub struct SubmitMessageHandler {
    store: Arc<dyn MessageStore>,
    registry: Arc<dyn ObserverRegistry>,
    policy: Arc<ContentPolicy>,
}

impl SubmitMessageHandler {
    pub fn new(
        store: Arc<dyn MessageStore>,
        registry: Arc<dyn ObserverRegistry>,
        policy: Arc<ContentPolicy>,
    ) -> Self {
        Self {
            store,
            registry,
            policy,
        }
    }

    pub async fn handle(&self, cmd: SubmitMessageCommand) -> Result<MessageView, MessageError> {
        // 1. Validate and enrich; nothing has happened yet on rejection
        let metadata = match self.policy.validate_and_enrich(&cmd.content) {
            Ok(metadata) => metadata,
            Err(err) => {
                tracing::info!(
                    message_id = %cmd.message_id,
                    session_id = %cmd.session_id,
                    "Message rejected: {}",
                    err
                );
                return Err(err);
            }
        };

        // 2. Persist and fan out. Runs detached from the caller: once the
        // write commits, the message is published even if the request is dropped.
        let message = Message::accept(cmd.into(), metadata);
        let task = tokio::spawn(persist_and_publish(
            Arc::clone(&self.store),
            Arc::clone(&self.registry),
            message,
        ));

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Submit task did not complete: {}", e);
                Err(MessageError::storage("submit task did not complete"))
            }
        }
    }
}

async fn persist_and_publish(
    store: Arc<dyn MessageStore>,
    registry: Arc<dyn ObserverRegistry>,
    message: Message,
) -> Result<MessageView, MessageError> {
    let stored = store.create(&message).await.map_err(|e| {
        let err = MessageError::from(e);
        match &err {
            MessageError::DuplicateId(id) => {
                tracing::info!(message_id = %id, "Duplicate message_id rejected");
            }
            other => {
                tracing::error!(
                    message_id = %message.id(),
                    session_id = %message.session_id(),
                    "Failed to store message: {}",
                    other
                );
            }
        }
        err
    })?;

    // 3. Fan out the stored representation
    let view = Arc::new(MessageView::from(&stored));
    let report = registry
        .fanout(stored.session_id(), ObserverEvent::NewMessage(view.clone()))
        .await;

    tracing::debug!(
        message_id = %stored.id(),
        session_id = %stored.session_id(),
        delivered = report.delivered,
        evicted = report.evicted,
        "Message stored and published"
    );

    Ok(Arc::unwrap_or_clone(view))
}
