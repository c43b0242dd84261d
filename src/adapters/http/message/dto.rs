//! HTTP DTOs for message endpoints.
//!
//! Responses carry `MessageView` directly so REST and WebSocket clients see
//! the same message representation.

use serde::Deserialize;

use crate::application::{GetSessionMessagesQuery, SearchMessagesQuery, SubmitMessageCommand};
use crate::domain::foundation::{MessageId, SessionId, Timestamp, ValidationError};
use crate::domain::message::Sender;
use crate::ports::PageRequest;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitMessageRequest {
    pub message_id: String,
    pub session_id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: Timestamp,
}

impl TryFrom<SubmitMessageRequest> for SubmitMessageCommand {
    type Error = ValidationError;

    fn try_from(req: SubmitMessageRequest) -> Result<Self, Self::Error> {
        Ok(SubmitMessageCommand {
            message_id: MessageId::new(req.message_id)?,
            session_id: SessionId::new(req.session_id)?,
            content: req.content,
            sender: req.sender,
            timestamp: req.timestamp,
        })
    }
}

/// Query parameters of `GET /api/messages/session/:session_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionMessagesParams {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    /// `user`, `system`, or empty for no filter.
    #[serde(default)]
    pub sender: Option<String>,
}

impl SessionMessagesParams {
    pub fn into_query(self, session_id: SessionId) -> Result<GetSessionMessagesQuery, ValidationError> {
        let sender = match self.sender.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(value.parse::<Sender>()?),
        };

        Ok(GetSessionMessagesQuery {
            session_id,
            page: PageRequest::from_optional(self.limit, self.offset)?,
            sender,
        })
    }
}

/// Query parameters of `GET /api/messages/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl From<SearchParams> for SearchMessagesQuery {
    fn from(params: SearchParams) -> Self {
        SearchMessagesQuery {
            query: params.query,
            limit: params.limit,
        }
    }
}
