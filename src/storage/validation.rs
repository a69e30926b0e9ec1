//! Path validation
//!
//! Turns untrusted identifiers into single path segments and keeps resolved
//! paths confined beneath the content root.

use std::path::{Component, Path, PathBuf};

/// Reduces an identifier to a single, separator-free path segment.
///
/// Only alphanumerics (any script), `-`, `_` and `.` are kept, so `/` and
/// `\` are always stripped. A result made only of dots would name the current or
/// parent directory and collapses to the empty string.
pub fn sanitize(name: &str) -> String {
    let segment: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();

    if segment.chars().all(|c| c == '.') {
        String::new()
    } else {
        segment
    }
}

/// Lexically normalizes a path: drops `.` components and folds `..` into
/// its parent without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push(Component::ParentDir);
                }
            }
            other => normalized.push(other),
        }
    }

    if normalized.as_os_str().is_empty() {
        normalized.push(Component::CurDir);
    }

    normalized
}
