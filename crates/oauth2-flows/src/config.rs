//! Flow configuration.
//!
//! Configuration is plain serde data with defaults for every field, so a
//! partial TOML file (or none at all) is valid.
//!
//! # Example (TOML)
//!
//! ```toml
//! authorization_code_lifetime = "30s"
//! response_mode = "redirect"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable prefix for overrides, e.g.
/// `OAUTH2_FLOWS__AUTHORIZATION_CODE_LIFETIME=1m`.
pub const ENV_PREFIX: &str = "OAUTH2_FLOWS";

/// Default configuration file looked up when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "oauth2-flows.toml";

/// How the caller wants grant results delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Redirect the user agent to the client's redirect URI.
    #[default]
    Redirect,
    /// Return the code (or error) directly to the caller.
    Direct,
}

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Lifetime of issued authorization codes.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Preferred response delivery for the authorization grant flow.
    pub response_mode: ResponseMode,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(30),
            response_mode: ResponseMode::Redirect,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// The configuration sources could not be read or merged.
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl OAuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The authorization code lifetime is zero
    /// - The logging level is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.authorization_code_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "authorization_code_lifetime must be greater than zero".to_string(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "logging.level cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Loads configuration from an optional TOML file and the environment.
///
/// Without `path`, [`DEFAULT_CONFIG_FILE`] is used if it exists. Variables
/// prefixed with [`ENV_PREFIX`] (nested keys separated by `__`) override
/// file values. The merged result is validated.
///
/// # Errors
///
/// Returns `ConfigError::Load` if a source cannot be read or deserialized,
/// and `ConfigError::InvalidValue` if validation fails.
pub fn load_config(path: Option<&str>) -> Result<OAuthConfig, ConfigError> {
    use config::{Config, Environment, File};

    let mut builder = Config::builder();
    let file = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
    if file.exists() {
        builder = builder.add_source(File::from(file));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .separator("__"),
    );

    let merged: OAuthConfig = builder
        .build()
        .map_err(|e| ConfigError::Load(format!("config build error: {e}")))?
        .try_deserialize()
        .map_err(|e| ConfigError::Load(format!("config deserialize error: {e}")))?;

    merged.validate()?;
    Ok(merged)
}
