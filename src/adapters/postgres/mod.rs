//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresMessageStore` - durable message storage, listing and search

mod message_store;

pub use message_store::PostgresMessageStore;
