//! Logging utilities
//!
//! Provides logging setup and configuration.

use env_logger::Env;

/// Setup logging for the vault
///
/// Logs at `info` unless `RUST_LOG` says otherwise. Safe to call more than
/// once; later calls leave the first logger in place.
pub fn setup_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
