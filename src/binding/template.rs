//! Placeholder Scanning - `{{key.path}}` discovery (v0.1)
//!
//! - Markup is stripped greedily (`<` through the last `>`) before matching,
//!   so a parent's `innerHTML` never claims a child's placeholder
//! - Only the first `{{...}}` of a source string is used
//! - A `<!-- namespace: someVar -->` comment prefixes every key of the fragment

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::Document;

/// Non-greedy `{{expression}}`
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(.+?)\}\}").expect("placeholder regex is valid"));

/// Greedy markup span, first `<` to last `>`
static MARKUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<.*>").expect("markup regex is valid"));

/// Body of a namespace directive comment
static NAMESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*namespace:\s*([\w.]+)\s*$").expect("namespace regex is valid")
});

/// Remove markup from a source string.
///
/// Returns `Cow::Borrowed` when there is nothing to strip.
pub fn strip_markup(text: &str) -> Cow<'_, str> {
    if !text.contains('<') {
        return Cow::Borrowed(text);
    }
    MARKUP_RE.replace(text, "")
}

/// Trimmed expression of the first placeholder, if any
pub fn first_placeholder(text: &str) -> Option<&str> {
    let expression = PLACEHOLDER_RE.captures(text)?.get(1)?.as_str().trim();
    (!expression.is_empty()).then_some(expression)
}

/// Whether the stripped text holds a usable placeholder
pub fn has_placeholder(text: &str) -> bool {
    first_placeholder(&strip_markup(text)).is_some()
}

/// Namespace from the first comment carrying a directive
pub fn namespace_of(document: &Document) -> Option<String> {
    document.comments().into_iter().find_map(|comment| {
        NAMESPACE_RE
            .captures(comment)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Prefix `expression` with the namespace, if any
pub fn qualify(expression: &str, namespace: Option<&str>, separator: char) -> String {
    match namespace {
        Some(ns) => format!("{ns}{separator}{expression}"),
        None => expression.to_string(),
    }
}
