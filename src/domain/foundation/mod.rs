//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, the timestamp value object, and error types
//! that form the vocabulary of the relay domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{MessageId, ObserverId, SessionId, MAX_ID_LENGTH};
pub use timestamp::Timestamp;
