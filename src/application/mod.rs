//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (submit) are separate from query handlers (list, search);
//! [`SessionGateway`] composes them with the observer registry.

mod gateway;
pub mod handlers;

pub use gateway::{ObserverConnection, SessionGateway};
pub use handlers::{
    GetSessionMessagesHandler, GetSessionMessagesQuery, SearchMessagesHandler,
    SearchMessagesQuery, SubmitMessageCommand, SubmitMessageHandler,
};
