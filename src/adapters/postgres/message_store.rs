//! PostgreSQL implementation of MessageStore.
//!
//! Rows live in the `messages` table (see `migrations/`). `seq` is a
//! BIGSERIAL used only for ordering, so listing and search return
//! insertion order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, MessageId, SessionId, Timestamp};
use crate::domain::message::{Message, MessageDraft, MessageMetadata, Sender};
use crate::ports::{MessageStore, PageRequest};

const MESSAGE_COLUMNS: &str = "message_id, session_id, content, sender, timestamp, \
                               word_count, character_count, processed_at";

/// PostgreSQL implementation of MessageStore.
#[derive(Clone)]
pub struct PostgresMessageStore {
    pool: PgPool,
}

impl PostgresMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to run migrations: {}", e)))
    }
}

#[async_trait]
impl MessageStore for PostgresMessageStore {
    async fn create(&self, message: &Message) -> Result<Message, DomainError> {
        let metadata = message.metadata();
        let sql = format!(
            r#"
            INSERT INTO messages ({MESSAGE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {MESSAGE_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(message.id().as_str())
            .bind(message.session_id().as_str())
            .bind(message.content())
            .bind(message.sender().as_str())
            .bind(message.timestamp().as_datetime())
            .bind(count_to_db(metadata.word_count))
            .bind(count_to_db(metadata.character_count))
            .bind(metadata.processed_at.as_datetime())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::new(
                        ErrorCode::DuplicateId,
                        format!("Message already exists: {}", message.id()),
                    )
                    .with_detail("message_id", message.id().as_str())
                } else {
                    DomainError::database(format!("Failed to insert message: {}", e))
                }
            })?;

        row_to_message(&row)
    }

    async fn list_by_session(
        &self,
        session_id: &SessionId,
        page: PageRequest,
        sender: Option<Sender>,
    ) -> Result<Vec<Message>, DomainError> {
        let sql = format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE session_id = $1
              AND ($2::TEXT IS NULL OR sender = $2)
            ORDER BY seq
            LIMIT $3 OFFSET $4
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(session_id.as_str())
            .bind(sender.map(|s| s.as_str()))
            .bind(i64::from(page.limit()))
            .bind(i64::from(page.offset()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to list messages: {}", e)))?;

        rows.iter().map(row_to_message).collect()
    }

    async fn search(&self, keyword: &str, limit: u32) -> Result<Vec<Message>, DomainError> {
        let sql = format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE content ILIKE $1 ESCAPE '\'
            ORDER BY seq
            LIMIT $2
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(like_pattern(keyword))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to search messages: {}", e)))?;

        rows.iter().map(row_to_message).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Row helpers
// ════════════════════════════════════════════════════════════════════════════

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

/// `%keyword%` with LIKE wildcards in the keyword escaped.
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn count_to_db(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn count_from_db(value: i32, column: &str) -> Result<u32, DomainError> {
    u32::try_from(value)
        .map_err(|_| DomainError::database(format!("Negative {} in stored message", column)))
}

fn column_error(column: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::database(format!("Failed to read column '{}': {}", column, e))
}

fn row_to_message(row: &PgRow) -> Result<Message, DomainError> {
    let message_id: String = row
        .try_get("message_id")
        .map_err(|e| column_error("message_id", e))?;
    let session_id: String = row
        .try_get("session_id")
        .map_err(|e| column_error("session_id", e))?;
    let content: String = row.try_get("content").map_err(|e| column_error("content", e))?;
    let sender: String = row.try_get("sender").map_err(|e| column_error("sender", e))?;
    let timestamp: DateTime<Utc> = row
        .try_get("timestamp")
        .map_err(|e| column_error("timestamp", e))?;
    let word_count: i32 = row
        .try_get("word_count")
        .map_err(|e| column_error("word_count", e))?;
    let character_count: i32 = row
        .try_get("character_count")
        .map_err(|e| column_error("character_count", e))?;
    let processed_at: DateTime<Utc> = row
        .try_get("processed_at")
        .map_err(|e| column_error("processed_at", e))?;

    let draft = MessageDraft {
        message_id: MessageId::new(message_id).map_err(|e| column_error("message_id", e))?,
        session_id: SessionId::new(session_id).map_err(|e| column_error("session_id", e))?,
        content,
        sender: sender.parse().map_err(|e| column_error("sender", e))?,
        timestamp: Timestamp::from_datetime(timestamp),
    };
    let metadata = MessageMetadata {
        word_count: count_from_db(word_count, "word_count")?,
        character_count: count_from_db(character_count, "character_count")?,
        processed_at: Timestamp::from_datetime(processed_at),
    };

    Ok(Message::accept(draft, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_keyword() {
        assert_eq!(like_pattern("hola"), "%hola%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }

    #[test]
    fn counts_convert_without_overflow() {
        assert_eq!(count_to_db(10), 10);
        assert_eq!(count_to_db(u32::MAX), i32::MAX);
        assert_eq!(count_from_db(3, "word_count").unwrap(), 3);
        assert!(count_from_db(-1, "word_count").is_err());
    }
}
