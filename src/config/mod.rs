//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `MESSAGE_RELAY` prefix
//! and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use message_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod rate_limit;
mod relay;
mod server;

pub use auth::{AuthConfig, MIN_PRODUCTION_KEY_LENGTH};
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use rate_limit::RateLimitSettings;
pub use relay::{RelayConfig, StoreBackend};
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bind address, environment, logging, HTTP timeouts and CORS
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection (only used with the postgres store)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Store backend, observer queue size, extra forbidden terms
    #[serde(default)]
    pub relay: RelayConfig,

    /// API key for REST routes
    pub auth: AuthConfig,

    /// Submission rate limit
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `MESSAGE_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `MESSAGE_RELAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `MESSAGE_RELAY__AUTH__API_KEY=...` -> `auth.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MESSAGE_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// The database section is only checked when the postgres store is
    /// selected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.relay.validate()?;
        if self.relay.store == StoreBackend::Postgres {
            self.database.validate()?;
        }
        self.auth.validate(&self.server.environment)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
