//! Media storage on disk
//!
//! Handles data URI decoding, path sanitization, and per-app file operations.

pub mod encoding;
pub mod operations;
pub mod validation;

pub use encoding::{DecodedMedia, decode_data_uri};
pub use operations::{DiskStorage, MAX_NAME_ATTEMPTS, TokenGenerator};
pub use validation::{normalize, sanitize};
