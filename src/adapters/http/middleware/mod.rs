//! HTTP middleware for axum.
//!
//! - `auth` - API key check for REST routes
//! - `rate_limit` - Per-IP limit on message submission

pub mod auth;
pub mod rate_limit;

pub use auth::{api_key_middleware, ApiKey, API_KEY_HEADER};
pub use rate_limit::{rate_limit_middleware, RateLimiterState, SUBMIT_RESOURCE};
