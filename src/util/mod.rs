//! Utilities Module - shared infrastructure (v0.1)
//!
//! Contains helper functions used across the codebase:
//! - `keypath`: Dotted storage key parser
//! - `value`: JSON truthiness and display conversion

pub mod keypath;
pub mod value;

// Re-export public items
pub use keypath::{split_key, DEFAULT_SEPARATOR};
pub use value::{display_value, is_truthy, type_name};
