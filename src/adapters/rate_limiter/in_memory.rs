//! In-memory rate limiter.
//!
//! Uses a fixed-window counter algorithm with an in-memory HashMap.
//! Counters are per process, so limits apply per relay instance.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter,
};

/// Fixed-window rate limiter: `limit` requests per key per `window_secs`.
#[derive(Debug)]
pub struct InMemoryRateLimiter {
    limit: u32,
    window_secs: u32,
    /// Per-key window state.
    windows: RwLock<HashMap<String, WindowState>>,
}

/// State for a single rate limit window.
#[derive(Debug, Clone)]
struct WindowState {
    /// Number of requests in the current window.
    count: u32,
    /// When the current window started.
    window_start: u64,
}

impl InMemoryRateLimiter {
    pub fn new(limit: u32, window_secs: u32) -> Self {
        Self {
            limit,
            window_secs: window_secs.max(1),
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// `limit` requests per minute.
    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, 60)
    }

    fn now_secs() -> u64 {
        Timestamp::now().as_unix_secs()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        let now = Self::now_secs();
        let window_secs = u64::from(self.window_secs);

        let mut windows = self.windows.write().await;

        // Drop expired windows so idle clients do not accumulate
        windows.retain(|_, state| now < state.window_start + window_secs);

        let state = windows.entry(key.to_string()).or_insert(WindowState {
            count: 0,
            window_start: now,
        });

        let window_end = state.window_start + window_secs;

        if state.count >= self.limit {
            let retry_after = window_end.saturating_sub(now) as u32;
            return Ok(RateLimitResult::Denied(RateLimitDenied {
                limit: self.limit,
                retry_after_secs: retry_after.max(1),
            }));
        }

        state.count += 1;

        Ok(RateLimitResult::Allowed(RateLimitStatus {
            limit: self.limit,
            remaining: self.limit.saturating_sub(state.count),
            reset_at: Timestamp::from_unix_secs(window_end),
        }))
    }
}
