//! Media vault core
//!
//! On-disk media storage for registered apps and the single set of
//! administrative credentials that guards them.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod storage;
pub mod utils;

pub use auth::CredentialStore;
pub use crate::config::VaultConfig;
pub use error::{CredentialError, StorageError, VaultError};
pub use server::Vault;
pub use storage::DiskStorage;
