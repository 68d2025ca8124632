//! # rf-configs
//!
//! Layered settings for the forum binary. Later layers win:
//!
//! 1. built-in defaults
//! 2. `rusty-forum.toml` in the working directory, or an explicit file
//! 3. `RF__SECTION__KEY` environment variables (a `.env` file is read first)

use std::path::Path;

use config::{Config, Environment, File};
use rf_core::ValidationLimits;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "RF";
pub const ENV_SEPARATOR: &str = "__";
const DEFAULT_FILE: &str = "rusty-forum";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// Connection URL; may embed credentials, so it is never logged.
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub limits: ValidationLimits,
}

impl Settings {
    /// Loads `.env`, then layers defaults, the config file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(path = %env_file.display(), "loaded .env");
        }
        Self::layered(path, Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR))
    }

    /// Builds settings from an explicit environment source.
    pub fn layered(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let limits = ValidationLimits::default();
        let mut builder = Config::builder()
            .set_default("database.url", "sqlite:rusty_forum.db")?
            .set_default("database.max_connections", 5_i64)?
            .set_default("logging.filter", "info")?
            .set_default("logging.json", false)?
            .set_default("limits.title_max_chars", limits.title_max_chars as i64)?
            .set_default("limits.content_max_chars", limits.content_max_chars as i64)?
            .set_default("limits.search_max_chars", limits.search_max_chars as i64)?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.expose_secret().trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be at least 1".into()));
        }
        let limits = &self.limits;
        if limits.title_max_chars == 0 || limits.content_max_chars == 0 || limits.search_max_chars == 0 {
            return Err(ConfigError::Invalid("limits must be positive".into()));
        }
        Ok(())
    }
}
