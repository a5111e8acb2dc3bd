//! Change events exchanged over the bus

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An event type the bus can route
///
/// The bus only ever sees `topic()`; it never names a topic itself.
pub trait BusEvent: Send + Sync {
    type Topic: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn topic(&self) -> Self::Topic;
}

/// Topics of `ChangeEvent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    StoreChanged,
    PresentationChanged,
}

/// Store / presentation change notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A store key was written (absent values travel as `null`)
    StoreChanged { key: String, value: Value },
    /// A bound input element was edited by the user
    PresentationChanged { key: String, value: Value },
}

impl ChangeEvent {
    pub fn store_changed(key: impl Into<String>, value: Value) -> Self {
        Self::StoreChanged {
            key: key.into(),
            value,
        }
    }

    pub fn presentation_changed(key: impl Into<String>, value: Value) -> Self {
        Self::PresentationChanged {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::StoreChanged { key, .. } | Self::PresentationChanged { key, .. } => key,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Self::StoreChanged { value, .. } | Self::PresentationChanged { value, .. } => value,
        }
    }
}

impl BusEvent for ChangeEvent {
    type Topic = Topic;

    fn topic(&self) -> Topic {
        match self {
            Self::StoreChanged { .. } => Topic::StoreChanged,
            Self::PresentationChanged { .. } => Topic::PresentationChanged,
        }
    }
}
