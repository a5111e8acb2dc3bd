//! DOM Module - presentation tree the binder works on (v0.1)
//!
//! Key types:
//! - `Document`: Arena of nodes addressed by `NodeId`
//! - `Element`: Tag, ordered attributes and live form state
//! - `Property`: Element properties reachable by bindings
//! - `FragmentParser` / `MarkupParser`: Markup → `Document`

mod document;
mod parser;
mod serialize;

// Re-export all public types
pub use document::{Document, Element, NodeData, NodeId, Property};
pub use parser::{FragmentParser, MarkupParser};

/// Elements that never have children or a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is raw text, not markup
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}
