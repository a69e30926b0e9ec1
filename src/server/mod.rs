//! Vault process core
//!
//! Bootstrap and shared state for the surrounding HTTP layer.

pub mod core;

pub use self::core::Vault;
