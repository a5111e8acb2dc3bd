//! Storage key parser - dotted notation (v0.1)
//!
//! Supports:
//! - `counter` (top-level key)
//! - `counter.input.value` (nested key, any depth)
//!
//! Does NOT support:
//! - Bracket indexing: `items[0]`
//! - Escaped separators: `a\.b`

use crate::error::{BinderyError, Result};

/// Default notation separator
pub const DEFAULT_SEPARATOR: char = '.';

/// Split a storage key into its segments
///
/// Examples:
/// - "counter" → ["counter"]
/// - "counter.input.value" → ["counter", "input", "value"]
pub fn split_key(key: &str, separator: char) -> Result<Vec<&str>> {
    if key.is_empty() {
        return Err(BinderyError::InvalidPath {
            key: key.to_string(),
            reason: "key is empty".to_string(),
        });
    }

    let segments: Vec<&str> = key.split(separator).collect();

    if let Some(pos) = segments.iter().position(|s| s.is_empty()) {
        return Err(BinderyError::InvalidPath {
            key: key.to_string(),
            reason: format!("segment {} is empty", pos + 1),
        });
    }

    Ok(segments)
}
