//! Administrative credentials
//!
//! Handles the admin credential pair, its undo snapshot, and input validation.

pub mod credentials;
pub mod validator;

pub use credentials::{CredentialPair, CredentialStore, DEFAULT_MAX_CREDENTIAL_LENGTH};
pub use validator::{is_valid_input, validate_credentials};
