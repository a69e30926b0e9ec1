//! Vault bootstrap
//!
//! Wires configuration, the disk worker and the credential store together
//! for the request handlers of the HTTP layer.

use log::{info, warn};
use std::sync::Arc;

use crate::auth::CredentialStore;
use crate::config::VaultConfig;
use crate::error::VaultError;
use crate::storage::DiskStorage;

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct Vault {
    config: Arc<VaultConfig>,
    storage: Arc<DiskStorage>,
    credentials: Arc<CredentialStore>,
}

impl Vault {
    /// Provisions the content root and verifies it before accepting work.
    pub async fn start(config: VaultConfig) -> Result<Self, VaultError> {
        let content_root = std::path::absolute(config.content_root())?;

        if let Err(e) = tokio::fs::create_dir_all(&content_root).await {
            warn!("Failed to create content root directory: {}", e);
        }

        let storage = DiskStorage::generate(&content_root).await?;
        let credentials = CredentialStore::new(config.max_credential_length);

        info!(
            "Vault ready: content root {} ({:?}, port {})",
            storage.root().display(),
            config.environment,
            config.port
        );

        Ok(Self {
            config: Arc::new(config),
            storage: Arc::new(storage),
            credentials: Arc::new(credentials),
        })
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn storage(&self) -> Arc<DiskStorage> {
        Arc::clone(&self.storage)
    }

    pub fn credentials(&self) -> Arc<CredentialStore> {
        Arc::clone(&self.credentials)
    }

    /// Clears the admin credentials; refused in production.
    pub fn dev_reset(&self) -> Result<(), VaultError> {
        if self.config.is_production() {
            warn!("Development reset requested in production");
            return Err(VaultError::Forbidden(
                "development reset is disabled in production".into(),
            ));
        }

        self.credentials.reset();
        info!("Development reset completed");
        Ok(())
    }

    /// Blocks until the process receives Ctrl-C.
    pub async fn run_until_shutdown(&self) -> Result<(), VaultError> {
        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_for(content_dir: &std::path::Path, environment: &str) -> VaultConfig {
        VaultConfig::from_toml_str(&format!(
            "content_dir = {:?}\nenvironment = {:?}",
            content_dir.display().to_string(),
            environment
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_start_creates_content_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("content");

        let vault = Vault::start(config_for(&root, "production")).await.unwrap();
        assert!(root.is_dir());
        assert_eq!(vault.storage().root(), root.as_path());
        assert!(!vault.credentials().is_set());
    }

    #[tokio::test]
    async fn test_start_fails_on_file_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("content");
        std::fs::write(&root, b"not a directory").unwrap();

        let err = Vault::start(config_for(&root, "production")).await.unwrap_err();
        assert!(matches!(err, VaultError::Storage(_)));
    }

    #[tokio::test]
    async fn test_dev_reset_depends_on_environment() {
        let dir = tempdir().unwrap();

        let dev = Vault::start(config_for(dir.path(), "development")).await.unwrap();
        dev.credentials().set("alice", "secret1").unwrap();
        dev.dev_reset().unwrap();
        assert!(!dev.credentials().is_set());

        let prod = Vault::start(config_for(dir.path(), "production")).await.unwrap();
        prod.credentials().set("alice", "secret1").unwrap();
        assert!(matches!(prod.dev_reset(), Err(VaultError::Forbidden(_))));
        assert!(prod.credentials().is_set());
    }

    #[tokio::test]
    async fn test_handlers_share_state() {
        let dir = tempdir().unwrap();
        let vault = Vault::start(config_for(dir.path(), "production")).await.unwrap();
        let handler_view = vault.clone();

        vault.credentials().set("alice", "secret1").unwrap();
        assert!(handler_view.credentials().test_against("alice", "secret1"));
    }
}
