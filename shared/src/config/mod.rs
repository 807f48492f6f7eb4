//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `scene` - Per-scene token, key and revocation configuration
//! - `cache` - Redis configuration for revocation records
//! - `environment` - Environment detection and logging configuration

pub mod cache;
pub mod environment;
pub mod scene;

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use scene::{KeyMaterial, LoginType, SceneConfig, ScenesConfig};

/// Prefix of environment variables overriding file configuration
pub const ENV_PREFIX: &str = "SCENEGATE";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Scene configurations
    pub scenes: ScenesConfig,

    /// Logging configuration; the environment's defaults apply when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

impl AppConfig {
    /// Load configuration for the current environment
    ///
    /// Reads `.env` if present, then the environment's TOML file (optional),
    /// then `SCENEGATE__*` variables, e.g. `SCENEGATE__CACHE__URL`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = Environment::from_env();
        Self::load_from(env.config_file())
    }

    /// Load configuration from a specific file, overlaid by environment variables
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Effective logging configuration
    pub fn logging_config(&self) -> LoggingConfig {
        self.logging
            .clone()
            .unwrap_or_else(|| LoggingConfig::for_environment(self.environment))
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
