//! Bindery Error Types with Error Codes
//!
//! Error code ranges:
//! - BIND-000-009: Path syntax errors
//! - BIND-010-019: Store structure errors
//! - BIND-020-029: Template / markup errors
//! - BIND-030-039: Resource errors
//! - BIND-040-049: Bus / listener errors
//! - BIND-050-059: Configuration and IO errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BinderyError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// All error variants are part of the public API.
#[derive(Error, Debug)]
pub enum BinderyError {
    // ═══════════════════════════════════════════
    // PATH ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[BIND-001] Invalid storage key '{key}': {reason}")]
    InvalidPath { key: String, reason: String },

    // ═══════════════════════════════════════════
    // STORE ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[BIND-010] Path conflict at '{key}': segment '{segment}' holds a {found}, not an object")]
    PathConflict {
        key: String,
        segment: String,
        found: String,
    },

    #[error("[BIND-011] Cannot merge a {found} into the store root (expected object)")]
    InvalidData { found: String },

    // ═══════════════════════════════════════════
    // TEMPLATE ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error("[BIND-020] Failed to parse template at byte {position}: {details}")]
    ParseFailure { position: usize, details: String },

    // ═══════════════════════════════════════════
    // RESOURCE ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[BIND-030] Resource '{url}' failed with status {status}")]
    ResourceFailure { url: String, status: u16 },

    #[error("[BIND-031] Resource '{path}' could not be retrieved: {details}")]
    ResourceMissing { path: String, details: String },

    // ═══════════════════════════════════════════
    // BUS ERRORS (040-049)
    // ═══════════════════════════════════════════
    #[error("[BIND-040] Listener failed: {0}")]
    Listener(String),

    // ═══════════════════════════════════════════
    // CONFIG / IO ERRORS (050-059)
    // ═══════════════════════════════════════════
    #[error("[BIND-050] Invalid configuration: {0}")]
    Config(String),

    #[error("[BIND-051] IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("[BIND-052] JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("[BIND-053] TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("[BIND-054] YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BinderyError {
    /// Short error code, e.g. "BIND-010"
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath { .. } => "BIND-001",
            Self::PathConflict { .. } => "BIND-010",
            Self::InvalidData { .. } => "BIND-011",
            Self::ParseFailure { .. } => "BIND-020",
            Self::ResourceFailure { .. } => "BIND-030",
            Self::ResourceMissing { .. } => "BIND-031",
            Self::Listener(_) => "BIND-040",
            Self::Config(_) => "BIND-050",
            Self::Io(_) => "BIND-051",
            Self::Json(_) => "BIND-052",
            Self::Toml(_) => "BIND-053",
            Self::Yaml(_) => "BIND-054",
        }
    }

    /// Resource errors mean "skip this render step", never a partial apply
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self,
            Self::ResourceFailure { .. } | Self::ResourceMissing { .. }
        )
    }
}

impl FixSuggestion for BinderyError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            Self::InvalidPath { .. } => Some("Use dotted keys without empty segments: a.b.c"),
            Self::PathConflict { .. } => {
                Some("Write the parent key as an object first, or bind a different key")
            }
            Self::InvalidData { .. } => Some("Component data files must contain a JSON object"),
            Self::ParseFailure { .. } => {
                Some("Check the template for unterminated tags, comments or quotes")
            }
            Self::ResourceFailure { .. } => Some("Check the component URL and server status"),
            Self::ResourceMissing { .. } => {
                Some("Check the components root and the component id")
            }
            Self::Listener(_) => None,
            Self::Config(_) => Some("Check bindery.toml and BINDERY_* environment variables"),
            Self::Io(_) => Some("Check file path and permissions"),
            Self::Json(_) => Some("Validate the JSON document (try parsing with jq)"),
            Self::Toml(_) => Some("Check TOML syntax in the configuration file"),
            Self::Yaml(_) => Some("Check YAML syntax: indentation and quoting"),
        }
    }
}
