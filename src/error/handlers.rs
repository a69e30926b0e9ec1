//! Error handlers
//!
//! Logging and status mapping for errors surfaced to the HTTP layer.

use crate::error::types::{CredentialError, StorageError, VaultError};
use log::error;

/// Handle a vault error
pub fn handle_error(err: &VaultError) {
    error!("Vault Error: {}", err);
}

/// Convert error to the HTTP status code the route layer answers with
pub fn status_code(err: &VaultError) -> u16 {
    match err {
        VaultError::Storage(e) => match e {
            StorageError::NotFound(_) => 404,
            StorageError::InvalidEncoding(_) => 400,
            StorageError::InvalidPath(_) => 400,
            StorageError::NameExhausted(_) => 500,
            StorageError::Io(_) => 500,
        },
        VaultError::Credential(e) => match e {
            CredentialError::InvalidInput(_) => 400,
            CredentialError::AlreadySet => 405,
            CredentialError::Unauthorized => 401,
        },
        // Development-only operations are hidden, not refused
        VaultError::Forbidden(_) => 404,
        VaultError::Config(_) => 500,
        VaultError::Io(_) => 500,
    }
}
