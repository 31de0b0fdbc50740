//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with CASEFILE_, sections split by `__`)
//! 2. Config file (casefile.toml)
//! 3. Default values
//!
//! Database credentials belong in `CASEFILE_DATABASE__URL`, not in the file.

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Log every statement sqlx executes
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://casefile.db?mode=rwc".to_string(),
            max_connections: 10,
            sqlx_logging: false,
        }
    }
}

/// Input validation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject malformed optional input instead of normalizing it
    pub strict: bool,
}

/// Record event bus settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub mailbox_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 256,
        }
    }
}

/// Listing defaults for callers that send no page size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub default_limit: i64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { default_limit: 20 }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub validation: ValidationConfig,
    pub events: EventConfig,
    pub listing: ListingConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("casefile.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // e.g. CASEFILE_DATABASE__URL, CASEFILE_VALIDATION__STRICT
            .add_source(
                Environment::with_prefix("CASEFILE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
