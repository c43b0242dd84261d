//! Relay behaviour configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Which message store backs the relay.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Process-local store; contents are lost on restart.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub store: StoreBackend,

    /// Per-observer outbound queue capacity. An observer whose queue is
    /// full at publish time is evicted.
    #[serde(default = "default_observer_buffer")]
    pub observer_buffer: usize,

    /// Comma-separated terms added to the built-in forbidden set.
    pub extra_forbidden_terms: Option<String>,
}

impl RelayConfig {
    pub fn extra_forbidden_terms_list(&self) -> Vec<String> {
        self.extra_forbidden_terms
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.observer_buffer == 0 {
            return Err(ValidationError::InvalidObserverBuffer);
        }
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::default(),
            observer_buffer: default_observer_buffer(),
            extra_forbidden_terms: None,
        }
    }
}

fn default_observer_buffer() -> usize {
    128
}
