//! API key configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum API key length accepted in production.
pub const MIN_PRODUCTION_KEY_LENGTH: usize = 16;

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Value clients must send in `X-API-Key`
    pub api_key: SecretString,
}

impl AuthConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
        }
    }

    /// Validate authentication configuration
    ///
    /// The key must be non-empty; production additionally requires
    /// [`MIN_PRODUCTION_KEY_LENGTH`] characters.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let key = self.api_key.expose_secret();
        if key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("MESSAGE_RELAY__AUTH__API_KEY"));
        }
        if *environment == Environment::Production
            && key.chars().count() < MIN_PRODUCTION_KEY_LENGTH
        {
            return Err(ValidationError::ApiKeyTooShort(MIN_PRODUCTION_KEY_LENGTH));
        }
        Ok(())
    }
}
