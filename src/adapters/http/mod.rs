//! HTTP adapters - REST API implementations.
//!
//! - `message` - submit, list and search endpoints
//! - `middleware` - API key and rate limit layers
//! - `response` - success/error envelope
//! - `router` - assembles everything, including the observer socket route

pub mod message;
pub mod middleware;
pub mod response;
pub mod router;

pub use response::{ApiSuccess, ErrorEnvelope, ErrorResponse};
pub use router::{build_router, HttpSettings};
