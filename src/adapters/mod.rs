//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `http` - axum REST surface
//! - `websocket` - observer sockets and the subscription registry
//! - `postgres` / `memory` - message stores
//! - `rate_limiter` - submit rate limiting

pub mod http;
pub mod memory;
pub mod postgres;
pub mod rate_limiter;
pub mod websocket;

pub use memory::InMemoryMessageStore;
pub use postgres::PostgresMessageStore;
pub use rate_limiter::InMemoryRateLimiter;
pub use websocket::SubscriptionRegistry;
