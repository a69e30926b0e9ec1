//! Configuration management for the media vault
//!
//! Values come from built-in defaults, an optional TOML file and
//! `MEDIA_VAULT_*` environment variables, in increasing precedence.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::PathBuf;

use crate::auth::DEFAULT_MAX_CREDENTIAL_LENGTH;

/// Environment variable naming the configuration file to load.
pub const CONFIG_PATH_VAR: &str = "MEDIA_VAULT_CONFIG";

/// Prefix for environment overrides, e.g. `MEDIA_VAULT_CONTENT_DIR`.
pub const ENV_PREFIX: &str = "MEDIA_VAULT";

/// Deployment environment; development unlocks destructive maintenance operations.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunEnvironment {
    Production,
    Development,
}

/// Complete vault configuration
#[derive(Debug, Deserialize, Clone)]
pub struct VaultConfig {
    /// Directory all media is stored beneath
    /// Environment: MEDIA_VAULT_CONTENT_DIR
    pub content_dir: String,

    /// Port the HTTP layer listens on
    /// Environment: MEDIA_VAULT_PORT
    pub port: u16,

    /// Environment: MEDIA_VAULT_ENVIRONMENT
    pub environment: RunEnvironment,

    /// Longest accepted admin username or password, in bytes
    pub max_credential_length: usize,
}

impl VaultConfig {
    /// Load configuration with environment overrides.
    ///
    /// The file named by `MEDIA_VAULT_CONFIG` must exist; without it a
    /// `config.toml` in the working directory is used when present.
    pub fn load() -> Result<Self, config::ConfigError> {
        let file = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => File::with_name(&path).required(true),
            Err(_) => File::with_name("config").required(false),
        };

        let settings = Self::builder()?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Self::finish(settings)
    }

    /// Load configuration from TOML text layered over the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::builder()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        Self::finish(settings)
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        Config::builder()
            .set_default("content_dir", "./content")?
            .set_default("port", 80_i64)?
            .set_default("environment", "production")?
            .set_default("max_credential_length", DEFAULT_MAX_CREDENTIAL_LENGTH as i64)
    }

    fn finish(settings: Config) -> Result<Self, config::ConfigError> {
        let config: VaultConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.content_dir.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "content_dir cannot be empty".into(),
            ));
        }

        if self.max_credential_length == 0 {
            return Err(config::ConfigError::Message(
                "max_credential_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get content directory as PathBuf
    pub fn content_root(&self) -> PathBuf {
        PathBuf::from(&self.content_dir)
    }

    pub fn is_production(&self) -> bool {
        self.environment == RunEnvironment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VaultConfig::from_toml_str("").unwrap();
        assert_eq!(config.content_dir, "./content");
        assert_eq!(config.port, 80);
        assert_eq!(config.environment, RunEnvironment::Production);
        assert_eq!(config.max_credential_length, DEFAULT_MAX_CREDENTIAL_LENGTH);
        assert!(config.is_production());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = VaultConfig::from_toml_str(
            r#"
            content_dir = "/var/lib/media-vault"
            port = 8080
            environment = "development"
            max_credential_length = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.content_root(), PathBuf::from("/var/lib/media-vault"));
        assert_eq!(config.port, 8080);
        assert!(!config.is_production());
        assert_eq!(config.max_credential_length, 64);
    }

    #[test]
    fn test_shipped_config_is_production() {
        let config = VaultConfig::from_toml_str(include_str!("../config.toml")).unwrap();
        assert!(config.is_production());
        assert_eq!(config.content_dir, "./content");
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(VaultConfig::from_toml_str("port = 0").is_err());
        assert!(VaultConfig::from_toml_str("content_dir = \"  \"").is_err());
        assert!(VaultConfig::from_toml_str("max_credential_length = 0").is_err());
        assert!(VaultConfig::from_toml_str("environment = \"staging\"").is_err());
    }
}
