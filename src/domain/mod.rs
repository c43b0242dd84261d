//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamp, errors)
//! - `message` - The message entity, content policy and enrichment

pub mod foundation;
pub mod message;
