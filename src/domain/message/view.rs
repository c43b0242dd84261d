//! Public representation of a stored message.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, SessionId, Timestamp};

use super::message::{Message, MessageMetadata, Sender};

/// What callers and observers see: the original fields plus metadata.
///
/// Used both as the submit/list/search response item and as the payload
/// pushed to live observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub message_id: MessageId,
    pub session_id: SessionId,
    pub content: String,
    pub timestamp: Timestamp,
    pub sender: Sender,
    pub metadata: MessageMetadata,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            message_id: message.id().clone(),
            session_id: message.session_id().clone(),
            content: message.content().to_string(),
            timestamp: *message.timestamp(),
            sender: message.sender(),
            metadata: *message.metadata(),
        }
    }
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        Self::from(&message)
    }
}
