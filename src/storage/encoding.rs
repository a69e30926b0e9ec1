//! Data URI decoding
//!
//! Parses `data:<mime>;base64,<payload>` strings into a file extension and
//! the decoded bytes to store.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::StorageError;

static MIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^data:(.*?);").expect("MIME pattern compiles"));

static CONTENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^data:.*?;base64,(.*)$").expect("payload pattern compiles")
});

// Standard alphabet; trailing `=` padding may be present or omitted
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Extensions for common media types whose registered list starts with a
/// rarely used spelling.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("audio/mpeg", "mp3"),
    ("audio/mp4", "m4a"),
    ("audio/ogg", "ogg"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("video/mpeg", "mpeg"),
    ("video/quicktime", "mov"),
    ("video/ogg", "ogv"),
    ("image/svg+xml", "svg"),
    ("text/plain", "txt"),
];

/// A decoded data URI ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMedia {
    pub mime_type: String,
    pub extension: String,
    pub content: Vec<u8>,
}

/// Maps a MIME type to a file extension.
///
/// Common types use a fixed extension (`audio/mpeg` maps to `mp3`). Others
/// prefer the extension spelled like the MIME subtype (`image/jpeg` maps to
/// `jpeg`), otherwise the first registered one.
pub fn extension_for(mime_type: &str) -> Option<String> {
    let mime_type = mime_type.trim().to_ascii_lowercase();
    if let Some((_, ext)) = PREFERRED_EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == mime_type)
    {
        return Some((*ext).to_string());
    }

    let extensions = mime_guess::get_mime_extensions_str(&mime_type)?;
    let subtype = mime_type.rsplit('/').next().unwrap_or_default();

    extensions
        .iter()
        .find(|ext| **ext == subtype)
        .or_else(|| extensions.first())
        .map(|ext| (*ext).to_string())
}

/// Parses and decodes a base64 data URI.
pub fn decode_data_uri(data_uri: &str) -> Result<DecodedMedia, StorageError> {
    let mime_type = MIME_PATTERN
        .captures(data_uri)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|mime| !mime.is_empty())
        .ok_or_else(|| StorageError::InvalidEncoding("missing MIME type".into()))?;

    let extension = extension_for(mime_type).ok_or_else(|| {
        StorageError::InvalidEncoding(format!("unsupported MIME type {}", mime_type))
    })?;

    let payload = CONTENT_PATTERN
        .captures(data_uri)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|payload| !payload.is_empty())
        .ok_or_else(|| StorageError::InvalidEncoding("missing base64 payload".into()))?;

    let content = PAYLOAD_ENGINE
        .decode(payload)
        .map_err(|e| StorageError::InvalidEncoding(format!("invalid base64 payload: {}", e)))?;

    Ok(DecodedMedia {
        mime_type: mime_type.to_string(),
        extension,
        content,
    })
}
