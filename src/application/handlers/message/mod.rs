//! Message command and query handlers.

mod get_session_messages;
mod search_messages;
mod submit_message;

pub use get_session_messages::{GetSessionMessagesHandler, GetSessionMessagesQuery};
pub use search_messages::{SearchMessagesHandler, SearchMessagesQuery};
pub use submit_message::{SubmitMessageCommand, SubmitMessageHandler};
