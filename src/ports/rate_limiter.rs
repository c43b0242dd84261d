//! Rate limiting port for message submission.
//!
//! Implementations use a fixed-window counter per key. Only the in-memory
//! adapter exists today; the port keeps the middleware backend-agnostic.

use async_trait::async_trait;
use std::fmt;

use crate::domain::foundation::Timestamp;

/// Port for rate limiting operations.
///
/// Implementations should be thread-safe and support concurrent access.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check if request is allowed, consuming a slot if so.
    async fn check(&self, key: &RateLimitKey) -> Result<RateLimitResult, RateLimitError>;
}

/// Key identifying what to rate limit.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    /// Logical resource being limited (e.g. `"submit"`).
    pub resource: &'static str,
    /// Caller identity within the resource (e.g. client IP).
    pub identifier: String,
}

impl RateLimitKey {
    /// Creates a per-IP key for a resource.
    pub fn ip(resource: &'static str, ip: &str) -> Self {
        Self {
            resource,
            identifier: ip.to_string(),
        }
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ratelimit:{}:{}", self.resource, self.identifier)
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed; includes current status.
    Allowed(RateLimitStatus),
    /// Request is denied; includes denial details.
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }
}

/// Quota state after an allowed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: Timestamp,
}

/// Details of a denied request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDenied {
    pub limit: u32,
    pub retry_after_secs: u32,
}

/// Errors from the rate limiter backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limiter unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limiter_is_object_safe() {
        fn _accepts_dyn(_limiter: &dyn RateLimiter) {}
    }

    #[test]
    fn key_displays_resource_and_identifier() {
        let key = RateLimitKey::ip("submit", "10.0.0.1");
        assert_eq!(key.to_string(), "ratelimit:submit:10.0.0.1");
    }
}
