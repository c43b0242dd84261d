//! Rate limit configuration

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Message submissions allowed per client IP per minute; 0 disables the limit.
    #[serde(default = "default_submit_per_minute")]
    pub submit_per_minute: u32,
}

impl RateLimitSettings {
    pub fn is_enabled(&self) -> bool {
        self.submit_per_minute > 0
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            submit_per_minute: default_submit_per_minute(),
        }
    }
}

fn default_submit_per_minute() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_by_default() {
        let settings = RateLimitSettings::default();
        assert_eq!(settings.submit_per_minute, 5);
        assert!(settings.is_enabled());
    }

    #[test]
    fn zero_disables() {
        assert!(!RateLimitSettings { submit_per_minute: 0 }.is_enabled());
    }
}
