//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `MessageStore` - Durable message persistence, listing and search
//! - `ObserverRegistry` - Live observers per session and fan-out
//! - `RateLimiter` - Submission throttling

mod message_store;
mod observer_registry;
mod rate_limiter;

pub use message_store::{
    MessageStore, PageRequest, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MAX_SEARCH_LIMIT,
};
pub use observer_registry::{
    DeliveryFailure, FanoutReport, Observer, ObserverEvent, ObserverRegistry, Subscription,
};
pub use rate_limiter::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};
