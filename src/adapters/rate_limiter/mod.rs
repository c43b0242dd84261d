//! Rate limiter adapters.
//!
//! Implementations of the RateLimiter port. Only the in-memory fixed-window
//! limiter exists; the submit middleware holds it as `Arc<dyn RateLimiter>`.

mod in_memory;

pub use in_memory::InMemoryRateLimiter;
