//! Message Relay - session-scoped message ingestion with live fan-out.
//!
//! Messages are validated against a content policy, enriched with derived
//! metadata, stored, and pushed to every WebSocket observer of their session.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
