//! Administrative credential storage
//!
//! Holds the single admin username/password pair together with a one-level
//! undo snapshot of the pair it last replaced.

use constant_time_eq::constant_time_eq;
use log::{debug, info};
use parking_lot::Mutex;

use super::validator::validate_credentials;
use crate::error::CredentialError;

/// Longest accepted username or password, in bytes.
pub const DEFAULT_MAX_CREDENTIAL_LENGTH: usize = 256;

/// A username/password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub user: String,
    pub pass: String,
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default)]
struct CredentialState {
    current: Option<CredentialPair>,
    // Outer `None` until the first mutation; `Some(None)` records "was unset"
    snapshot: Option<Option<CredentialPair>>,
}

impl CredentialState {
    /// Swaps in a new pair, keeping the replaced one as the only snapshot.
    fn replace(&mut self, next: Option<CredentialPair>) {
        let previous = std::mem::replace(&mut self.current, next);
        self.snapshot = Some(previous);
    }
}

/// Single-slot admin credential holder shared by the request handlers.
#[derive(Debug)]
pub struct CredentialStore {
    state: Mutex<CredentialState>,
    max_length: usize,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CREDENTIAL_LENGTH)
    }
}

impl CredentialStore {
    /// Creates an empty store accepting fields up to `max_length` bytes.
    pub fn new(max_length: usize) -> Self {
        Self {
            state: Mutex::new(CredentialState::default()),
            max_length,
        }
    }

    /// Returns whether both username and password are present.
    pub fn is_set(&self) -> bool {
        self.state.lock().current.is_some()
    }

    /// Replaces the credentials, snapshotting the previous pair.
    ///
    /// Validation runs before any mutation, so a rejected pair leaves both
    /// the current credentials and the snapshot untouched.
    pub fn set(&self, user: &str, pass: &str) -> Result<(), CredentialError> {
        validate_credentials(user, pass, self.max_length)?;

        self.state.lock().replace(Some(CredentialPair {
            user: user.to_string(),
            pass: pass.to_string(),
        }));
        info!("Admin credentials updated");
        Ok(())
    }

    /// Sets the credentials for the first time only.
    pub fn initialize(&self, user: &str, pass: &str) -> Result<(), CredentialError> {
        validate_credentials(user, pass, self.max_length)?;

        let mut state = self.state.lock();
        if state.current.is_some() {
            return Err(CredentialError::AlreadySet);
        }
        state.replace(Some(CredentialPair {
            user: user.to_string(),
            pass: pass.to_string(),
        }));
        info!("Admin credentials initialized");
        Ok(())
    }

    /// Clears the credentials, snapshotting the previous pair.
    pub fn reset(&self) {
        self.state.lock().replace(None);
        info!("Admin credentials erased");
    }

    /// Reverts the last mutation.
    ///
    /// The pair being replaced becomes the new snapshot, so a second restore
    /// swaps back instead of walking further into history.
    pub fn restore(&self) {
        let mut state = self.state.lock();
        match state.snapshot.take() {
            Some(previous) => {
                state.replace(previous);
                info!("Admin credentials restored");
            }
            None => debug!("No credential snapshot to restore"),
        }
    }

    /// Returns whether the given pair exactly matches the current one.
    pub fn test_against(&self, user: &str, pass: &str) -> bool {
        let state = self.state.lock();
        match &state.current {
            Some(current) => {
                let user_matches = constant_time_eq(current.user.as_bytes(), user.as_bytes());
                let pass_matches = constant_time_eq(current.pass.as_bytes(), pass.as_bytes());
                user_matches & pass_matches
            }
            None => false,
        }
    }

    /// Admits a request only when credentials are set and match.
    pub fn authorize(&self, user: &str, pass: &str) -> Result<(), CredentialError> {
        if self.test_against(user, pass) {
            Ok(())
        } else {
            debug!("Rejected admin credentials");
            Err(CredentialError::Unauthorized)
        }
    }

    /// Returns a copy of the current pair.
    pub fn current(&self) -> Option<CredentialPair> {
        self.state.lock().current.clone()
    }
}
