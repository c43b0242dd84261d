//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod message;

pub use message::{
    GetSessionMessagesHandler, GetSessionMessagesQuery, SearchMessagesHandler,
    SearchMessagesQuery, SubmitMessageCommand, SubmitMessageHandler,
};
