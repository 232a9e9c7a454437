//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional TOML file merged with `ARTIVAULT__`-prefixed environment
//! variables. Each sub-module represents a logical configuration section.

pub mod database;
pub mod logging;
pub mod sharing;
pub mod storage;
pub mod versioning;

use serde::{Deserialize, Serialize};

pub use self::database::{DatabaseConfig, DatabaseProvider};
pub use self::logging::LoggingConfig;
pub use self::sharing::SharingConfig;
pub use self::storage::{LocalStorageConfig, StorageConfig, StorageProviderKind};
pub use self::versioning::VersioningConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Content storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Share link settings.
    #[serde(default)]
    pub sharing: SharingConfig,
    /// Version history settings.
    #[serde(default)]
    pub versioning: VersioningConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional. Environment variables use the `ARTIVAULT`
    /// prefix and `__` as the section separator, e.g.
    /// `ARTIVAULT__DATABASE__URL`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("ARTIVAULT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.provider == DatabaseProvider::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required when database.provider = \"postgres\"",
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::configuration(
                "database.min_connections must not exceed database.max_connections",
            ));
        }
        if self.storage.provider == StorageProviderKind::Local
            && self.storage.local.root_path.trim().is_empty()
        {
            return Err(AppError::configuration("storage.local.root_path is empty"));
        }
        if self.storage.max_content_size_bytes == 0 {
            return Err(AppError::configuration(
                "storage.max_content_size_bytes must be positive",
            ));
        }
        if self.versioning.max_change_note_chars == 0 {
            return Err(AppError::configuration(
                "versioning.max_change_note_chars must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_memory_backends() {
        let config = AppConfig::default();
        assert_eq!(config.database.provider, DatabaseProvider::Memory);
        assert_eq!(config.storage.provider, StorageProviderKind::Memory);
        assert_eq!(config.versioning.max_change_note_chars, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_requires_url() {
        let mut config = AppConfig::default();
        config.database.provider = DatabaseProvider::Postgres;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Configuration);

        config.database.url = "postgres://localhost/artivault".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load("does/not/exist").expect("defaults should load");
        assert_eq!(config.logging.level, "info");
    }
}
