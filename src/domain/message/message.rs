//! Message entity and its value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{MessageId, SessionId, Timestamp, ValidationError};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    System,
}

impl Sender {
    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::System => "system",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "system" => Ok(Sender::System),
            other => Err(ValidationError::invalid_format(
                "sender",
                format!("expected 'user' or 'system', got '{}'", other),
            )),
        }
    }
}

/// Metadata derived from content at acceptance time.
///
/// Only ever produced as a whole by the content policy, so a stored
/// message either carries all three fields or was never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub word_count: u32,
    pub character_count: u32,
    pub processed_at: Timestamp,
}

/// A message as submitted by a caller, before validation and enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub message_id: MessageId,
    pub session_id: SessionId,
    pub content: String,
    pub sender: Sender,
    pub timestamp: Timestamp,
}

/// An accepted, enriched message. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    session_id: SessionId,
    content: String,
    sender: Sender,
    timestamp: Timestamp,
    metadata: MessageMetadata,
}

impl Message {
    /// Combines a draft with the metadata computed for its content.
    pub fn accept(draft: MessageDraft, metadata: MessageMetadata) -> Self {
        Self {
            id: draft.message_id,
            session_id: draft.session_id,
            content: draft.content,
            sender: draft.sender,
            timestamp: draft.timestamp,
            metadata,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// When the caller says the message was authored.
    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn metadata(&self) -> &MessageMetadata {
        &self.metadata
    }
}
