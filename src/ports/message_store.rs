//! Message store port.
//!
//! Defines the durable storage contract the relay depends on. Both the
//! write path (submission) and the read path (listing, search) go through
//! this trait and nothing else; the observer registry is never involved.
//!
//! # Design
//!
//! - **Per-call atomicity only**: no cross-call transactions are assumed
//! - **Identity enforced by the store**: a second `create` with the same id
//!   fails with `ErrorCode::DuplicateId` and leaves the first record intact
//! - **Stable order**: listing returns insertion order for a fixed dataset

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SessionId, ValidationError};
use crate::domain::message::{Message, Sender};

/// Default page size for listing and search.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Search results are silently capped at this many records.
pub const MAX_SEARCH_LIMIT: u32 = 1000;

/// Repository port for message persistence and queries.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message and return the stored record.
    ///
    /// # Errors
    ///
    /// - `DuplicateId` (with a `message_id` detail) if the id already exists
    /// - `DatabaseError` on persistence failure
    async fn create(&self, message: &Message) -> Result<Message, DomainError>;

    /// List messages of one session in store order, optionally for one sender.
    ///
    /// Returns at most `page.limit()` records after skipping `page.offset()`.
    async fn list_by_session(
        &self,
        session_id: &SessionId,
        page: PageRequest,
        sender: Option<Sender>,
    ) -> Result<Vec<Message>, DomainError>;

    /// Case-insensitive substring search over message content.
    ///
    /// Returns at most `limit` records in store order.
    async fn search(&self, keyword: &str, limit: u32) -> Result<Vec<Message>, DomainError>;
}

/// Validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: u32,
    offset: u32,
}

impl PageRequest {
    /// Creates a page, enforcing `1 <= limit <= MAX_PAGE_LIMIT`.
    pub fn new(limit: u32, offset: u32) -> Result<Self, ValidationError> {
        validate_limit(limit)?;
        Ok(Self { limit, offset })
    }

    /// Builds a page from optional query parameters, applying defaults.
    pub fn from_optional(limit: Option<u32>, offset: Option<u32>) -> Result<Self, ValidationError> {
        Self::new(limit.unwrap_or(DEFAULT_PAGE_LIMIT), offset.unwrap_or(0))
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Checks a caller-supplied result limit against the allowed range.
pub fn validate_limit(limit: u32) -> Result<u32, ValidationError> {
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::out_of_range(
            "limit",
            1,
            i64::from(MAX_PAGE_LIMIT),
            i64::from(limit),
        ));
    }
    Ok(limit)
}
