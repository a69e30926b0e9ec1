//! Error types
//!
//! Defines domain-specific error types for each component of the vault.

use std::fmt;
use std::io;

/// Storage component errors
#[derive(Debug)]
pub enum StorageError {
    /// The requested media file does not exist.
    NotFound(String),
    /// The data URI is malformed or declares an unsupported MIME type.
    InvalidEncoding(String),
    /// No collision-free file name was found within the attempt bound.
    NameExhausted(usize),
    /// The app identifier does not name a usable namespace.
    InvalidPath(String),
    Io(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(p) => write!(f, "File not found: {}", p),
            StorageError::InvalidEncoding(msg) => write!(f, "Invalid data URI: {}", msg),
            StorageError::NameExhausted(attempts) => write!(
                f,
                "Couldn't generate an available file name after {} attempts",
                attempts
            ),
            StorageError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            StorageError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::Io(error)
    }
}

/// Credential component errors
#[derive(Debug, PartialEq, Eq)]
pub enum CredentialError {
    InvalidInput(String),
    AlreadySet,
    Unauthorized,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::InvalidInput(s) => write!(f, "Invalid credentials: {}", s),
            CredentialError::AlreadySet => write!(f, "Credentials have already been set"),
            CredentialError::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

impl std::error::Error for CredentialError {}

/// General vault error that encompasses all error types
#[derive(Debug)]
pub enum VaultError {
    Storage(StorageError),
    Credential(CredentialError),
    Config(config::ConfigError),
    /// The operation is disabled in the current environment.
    Forbidden(String),
    Io(io::Error),
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultError::Storage(e) => write!(f, "Storage error: {}", e),
            VaultError::Credential(e) => write!(f, "Credential error: {}", e),
            VaultError::Config(e) => write!(f, "Configuration error: {}", e),
            VaultError::Forbidden(s) => write!(f, "Forbidden: {}", s),
            VaultError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for VaultError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VaultError::Storage(e) => Some(e),
            VaultError::Credential(e) => Some(e),
            VaultError::Config(e) => Some(e),
            VaultError::Io(e) => Some(e),
            VaultError::Forbidden(_) => None,
        }
    }
}

impl From<StorageError> for VaultError {
    fn from(error: StorageError) -> Self {
        VaultError::Storage(error)
    }
}

impl From<CredentialError> for VaultError {
    fn from(error: CredentialError) -> Self {
        VaultError::Credential(error)
    }
}

impl From<config::ConfigError> for VaultError {
    fn from(error: config::ConfigError) -> Self {
        VaultError::Config(error)
    }
}

impl From<io::Error> for VaultError {
    fn from(error: io::Error) -> Self {
        VaultError::Io(error)
    }
}
