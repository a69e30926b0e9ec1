//! Credential input validation
//!
//! Rejects credential fields the store cannot hold before they reach it.
//! Empty and whitespace-only values are legitimate credentials.

use crate::error::CredentialError;

/// Checks a single credential field: at most `max_length` bytes and no NUL.
pub fn is_valid_input(input: &str, max_length: usize) -> bool {
    input.len() <= max_length && !input.contains('\0')
}

/// Validates a username/password pair.
pub fn validate_credentials(
    user: &str,
    pass: &str,
    max_length: usize,
) -> Result<(), CredentialError> {
    if !is_valid_input(user, max_length) {
        return Err(CredentialError::InvalidInput("Invalid username format".into()));
    }

    if !is_valid_input(pass, max_length) {
        return Err(CredentialError::InvalidInput("Invalid password format".into()));
    }

    Ok(())
}
