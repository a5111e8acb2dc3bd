//! Binder Configuration (v0.1)
//!
//! Naming knobs for the binding layer and component rendering.
//!
//! Precedence, highest first:
//! 1. `BINDERY_*` environment variables
//! 2. The file given with `--config`, or `./bindery.toml` when present
//! 3. Built-in defaults
//!
//! ```toml
//! prefix = "data-tpl-"
//! unique = "key"
//! notation = "."
//! root_element = "tpl"
//! components_root = "components"
//!
//! [extensions]
//! view = ".html"
//! data = ".json"
//! styles = ".css"
//! script = ".js"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::binding::Family;
use crate::error::{BinderyError, Result};

/// Default config file looked up in the working directory
pub const CONFIG_FILE: &str = "bindery.toml";

/// Overrides the marker attribute prefix
pub const ENV_PREFIX: &str = "BINDERY_PREFIX";

/// Overrides the components root
pub const ENV_COMPONENTS: &str = "BINDERY_COMPONENTS";

/// File extensions of the four component resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extensions {
    pub view: String,
    pub data: String,
    pub styles: String,
    pub script: String,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            view: ".html".to_string(),
            data: ".json".to_string(),
            styles: ".css".to_string(),
            script: ".js".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Prefix of every marker attribute (`data-tpl-value`, `data-tpl-key`, ...)
    pub prefix: String,
    /// Suffix of the per-node unique binding attribute
    pub unique: String,
    /// Key path separator
    pub notation: char,
    /// Tag name of component placeholders in a page
    pub root_element: String,
    /// Directory (or URL path) holding one folder per component
    pub components_root: String,
    pub extensions: Extensions,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            prefix: "data-tpl-".to_string(),
            unique: "key".to_string(),
            notation: crate::util::DEFAULT_SEPARATOR,
            root_element: "tpl".to_string(),
            components_root: "components".to_string(),
            extensions: Extensions::default(),
        }
    }
}

impl BinderConfig {
    /// Load configuration following the documented precedence.
    ///
    /// An explicit `path` must exist. Without one, `./bindery.toml` is used
    /// when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE).exists() => Self::from_file(Path::new(CONFIG_FILE))?,
            None => Self::default(),
        };
        let config = config.with_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BinderyError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Merge with environment variables. Empty values are ignored.
    pub fn with_env(mut self) -> Self {
        if let Ok(prefix) = std::env::var(ENV_PREFIX) {
            if !prefix.is_empty() {
                self.prefix = prefix;
            }
        }
        if let Ok(root) = std::env::var(ENV_COMPONENTS) {
            if !root.is_empty() {
                self.components_root = root;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(BinderyError::Config("prefix must not be empty".into()));
        }
        if self.unique.is_empty() {
            return Err(BinderyError::Config("unique suffix must not be empty".into()));
        }
        if self.notation.is_alphanumeric() || self.notation.is_whitespace() {
            return Err(BinderyError::Config(format!(
                "notation '{}' must be a punctuation character",
                self.notation
            )));
        }
        if Family::ALL.iter().any(|f| f.suffix() == self.unique) {
            return Err(BinderyError::Config(format!(
                "unique suffix '{}' collides with a family marker",
                self.unique
            )));
        }
        if self.root_element.is_empty() {
            return Err(BinderyError::Config("root_element must not be empty".into()));
        }
        Ok(())
    }

    /// Attribute carrying the binder id, e.g. `data-tpl-key`
    pub fn unique_attribute(&self) -> String {
        format!("{}{}", self.prefix, self.unique)
    }

    /// Marker attribute of a family, e.g. `data-tpl-value`
    pub fn marker_attribute(&self, family: Family) -> String {
        format!("{}{}", self.prefix, family.suffix())
    }

    /// Relative resource path of a component file, e.g. `counter/index.html`
    pub fn resource_path(&self, component: &str, extension: &str) -> String {
        format!("{}/index{}", component, extension)
    }
}
