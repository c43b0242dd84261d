//! Message domain module.
//!
//! A message is accepted exactly once: the draft submitted by a caller is
//! checked against the [`ContentPolicy`], enriched with derived metadata,
//! and only then becomes a [`Message`] that may be stored and fanned out.

mod errors;
mod message;
mod policy;
mod view;

pub use errors::MessageError;
pub use message::{Message, MessageDraft, MessageMetadata, Sender};
pub use policy::{
    character_count, validate_and_enrich, word_count, ContentPolicy, DEFAULT_FORBIDDEN_TERMS,
};
pub use view::MessageView;
