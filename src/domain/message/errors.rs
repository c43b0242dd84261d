//! Message-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, MessageId, ValidationError};

/// Errors surfaced by message submission and queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// Content contains a forbidden term.
    ProhibitedContent,
    /// A message with this id is already stored.
    DuplicateId(MessageId),
    /// A request field or query parameter is malformed.
    InvalidQuery { field: String, message: String },
    /// The message store failed.
    Storage(String),
}

impl MessageError {
    pub fn invalid_query(field: impl Into<String>, message: impl Into<String>) -> Self {
        MessageError::InvalidQuery {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        MessageError::Storage(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            MessageError::ProhibitedContent => ErrorCode::ProhibitedContent,
            MessageError::DuplicateId(_) => ErrorCode::DuplicateId,
            MessageError::InvalidQuery { .. } => ErrorCode::InvalidFormat,
            MessageError::Storage(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            MessageError::ProhibitedContent => "Message contains inappropriate language".to_string(),
            MessageError::DuplicateId(_) => "The message_id already exists".to_string(),
            MessageError::InvalidQuery { field, message } => {
                format!("Invalid value for '{}': {}", field, message)
            }
            MessageError::Storage(msg) => format!("Storage failure: {}", msg),
        }
    }
}

impl std::fmt::Display for MessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for MessageError {}

impl From<ValidationError> for MessageError {
    fn from(err: ValidationError) -> Self {
        MessageError::InvalidQuery {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for MessageError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::DuplicateId => {
                match err.details.get("message_id").map(MessageId::new) {
                    Some(Ok(id)) => MessageError::DuplicateId(id),
                    _ => MessageError::Storage(err.to_string()),
                }
            }
            ErrorCode::ProhibitedContent => MessageError::ProhibitedContent,
            ErrorCode::InvalidFormat => MessageError::InvalidQuery {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => MessageError::Storage(err.to_string()),
        }
    }
}
