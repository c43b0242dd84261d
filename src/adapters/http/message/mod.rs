//! HTTP adapter for message endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{SearchParams, SessionMessagesParams, SubmitMessageRequest};
pub use handlers::MessageHandlers;
pub use routes::message_routes;
