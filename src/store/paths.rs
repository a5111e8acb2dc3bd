//! PathStore - nested tree addressed by dotted keys (v0.1)
//!
//! Writes walk the key segment by segment and create missing intermediate
//! objects. Reads never create anything.
//!
//! Conflict policy: an intermediate segment holding `null` is coerced into an
//! object; any other non-object value (scalar or array) fails the write with
//! `PathConflict` and leaves the tree untouched.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{BinderyError, Result};
use crate::util::{split_key, type_name, DEFAULT_SEPARATOR};

/// Functional update: receives the prior value (if any), returns the new one
pub type Updater = Box<dyn FnOnce(Option<&Value>) -> Value + Send>;

/// What a `set` does to the terminal slot
pub enum Update {
    /// Create intermediate objects but leave the slot as it is
    Keep,
    /// Replace the slot
    Value(Value),
    /// Compute the slot from its prior value
    Apply(Updater),
}

impl Update {
    /// Build a functional update
    pub fn apply<F>(f: F) -> Self
    where
        F: FnOnce(Option<&Value>) -> Value + Send + 'static,
    {
        Self::Apply(Box::new(f))
    }

    /// Turn a functional update into a plain value against `prior`
    pub(crate) fn resolve(self, prior: Option<&Value>) -> Self {
        match self {
            Self::Apply(f) => Self::Value(f(prior)),
            other => other,
        }
    }
}

impl From<Value> for Update {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Option<Value>> for Update {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Self::Keep, Self::Value)
    }
}

impl fmt::Debug for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => f.write_str("Keep"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

/// Nested key-value tree
#[derive(Debug, Clone)]
pub struct PathStore {
    data: Map<String, Value>,
    separator: char,
}

impl Default for PathStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PathStore {
    /// Create an empty store using `.` as notation separator
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    /// Create an empty store with a custom notation separator
    pub fn with_separator(separator: char) -> Self {
        Self {
            data: Map::new(),
            separator,
        }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Write `update` at `key`, returning the slot's resulting value
    ///
    /// `Update::Keep` returns the existing value (or `None`) untouched.
    pub fn set(&mut self, key: &str, update: impl Into<Update>) -> Result<Option<Value>> {
        let segments = split_key(key, self.separator)?;
        let Some((last, parents)) = segments.split_last() else {
            return Ok(None);
        };

        let parent = walk_mut(&mut self.data, key, parents)?;

        match update.into() {
            Update::Keep => Ok(parent.get(*last).cloned()),
            Update::Value(value) => {
                parent.insert((*last).to_string(), value.clone());
                Ok(Some(value))
            }
            Update::Apply(f) => {
                let next = f(parent.get(*last));
                parent.insert((*last).to_string(), next.clone());
                Ok(Some(next))
            }
        }
    }

    /// Create every intermediate object of `key` without writing a value
    pub fn ensure(&mut self, key: &str) -> Result<Option<Value>> {
        self.set(key, Update::Keep)
    }

    /// Resolve `key` without side effects
    ///
    /// Numeric segments may index into arrays on read (`items.0`).
    pub fn get(&self, key: &str) -> Option<&Value> {
        let segments = split_key(key, self.separator).ok()?;
        let (first, rest) = segments.split_first()?;

        let mut value = self.data.get(*first)?;
        for segment in rest {
            value = match value {
                Value::Object(map) => map.get(*segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(value)
    }

    /// Check if a value is stored at `key`
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The live root mapping (not a copy)
    pub fn print(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Mutable access to the live root mapping
    pub fn print_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.data
    }

    /// Deep-merge an object document into the root
    pub fn merge_document(&mut self, source: &Value) -> Result<()> {
        match source {
            Value::Object(map) => {
                merge(&mut self.data, map);
                Ok(())
            }
            other => Err(BinderyError::InvalidData {
                found: type_name(other).to_string(),
            }),
        }
    }
}

/// Descend through `parents`, creating objects where nothing is stored yet
fn walk_mut<'a>(
    root: &'a mut Map<String, Value>,
    key: &str,
    parents: &[&str],
) -> Result<&'a mut Map<String, Value>> {
    // Check before mutating so a conflicting write leaves no partial path
    check_path(root, key, parents)?;

    let mut current = root;
    for segment in parents {
        let slot = current
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if slot.is_null() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => current = map,
            other => {
                return Err(conflict(key, segment, other));
            }
        }
    }
    Ok(current)
}

fn check_path(root: &Map<String, Value>, key: &str, parents: &[&str]) -> Result<()> {
    let mut current = root;
    for segment in parents {
        match current.get(*segment) {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Object(map)) => current = map,
            Some(other) => return Err(conflict(key, segment, other)),
        }
    }
    Ok(())
}

fn conflict(key: &str, segment: &str, found: &Value) -> BinderyError {
    BinderyError::PathConflict {
        key: key.to_string(),
        segment: segment.to_string(),
        found: type_name(found).to_string(),
    }
}

/// Deep-merge `source` into `target`
///
/// Objects are merged recursively; every other value (arrays included)
/// replaces what the target holds.
pub fn merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, incoming) in source {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => merge(existing, nested),
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ═══════════════════════════════════════════════════════════════
    // set / get
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn set_and_get_top_level() {
        let mut store = PathStore::new();
        let stored = store.set("title", json!("Hello")).unwrap();
        assert_eq!(stored, Some(json!("Hello")));
        assert_eq!(store.get("title"), Some(&json!("Hello")));
    }

    #[test]
    fn set_nested_creates_intermediates() {
        let mut store = PathStore::new();
        store.set("a.b.c", json!(5)).unwrap();

        assert_eq!(store.get("a.b.c"), Some(&json!(5)));
        assert_eq!(store.get("a.b"), Some(&json!({"c": 5})));
    }

    #[test]
    fn set_preserves_siblings() {
        let mut store = PathStore::new();
        store.set("counter.input.value", json!(1)).unwrap();
        store.set("counter.checkbox.checked", json!(true)).unwrap();

        assert_eq!(
            store.print().get("counter"),
            Some(&json!({"input": {"value": 1}, "checkbox": {"checked": true}}))
        );
    }

    #[test]
    fn functional_update_uses_prior_value() {
        let mut store = PathStore::new();
        store.set("x", json!(1)).unwrap();
        let next = store
            .set(
                "x",
                Update::apply(|prior| json!(prior.and_then(Value::as_i64).unwrap_or(0) + 1)),
            )
            .unwrap();

        assert_eq!(next, Some(json!(2)));
        assert_eq!(store.get("x"), Some(&json!(2)));
    }

    #[test]
    fn functional_update_on_absent_slot() {
        let mut store = PathStore::new();
        store
            .set("n.count", Update::apply(|prior| json!(prior.is_none())))
            .unwrap();
        assert_eq!(store.get("n.count"), Some(&json!(true)));
    }

    #[test]
    fn keep_does_not_overwrite() {
        let mut store = PathStore::new();
        store.set("a.b", json!("kept")).unwrap();

        let result = store.set("a.b", Update::Keep).unwrap();
        assert_eq!(result, Some(json!("kept")));
        assert_eq!(store.get("a.b"), Some(&json!("kept")));

        let none: Option<Value> = None;
        store.set("a.b", none).unwrap();
        assert_eq!(store.get("a.b"), Some(&json!("kept")));
    }

    #[test]
    fn ensure_creates_path_without_value() {
        let mut store = PathStore::new();
        let result = store.ensure("counter.input.value").unwrap();

        assert_eq!(result, None);
        assert_eq!(store.get("counter.input"), Some(&json!({})));
        assert!(!store.contains("counter.input.value"));
    }

    #[test]
    fn get_does_not_create() {
        let store = PathStore::new();
        assert_eq!(store.get("missing.deep.key"), None);
        assert!(store.print().is_empty());
    }

    #[test]
    fn get_indexes_arrays_on_read() {
        let mut store = PathStore::new();
        store.set("list", json!(["first", "second"])).unwrap();
        assert_eq!(store.get("list.1"), Some(&json!("second")));
        assert_eq!(store.get("list.9"), None);
        assert_eq!(store.get("list.x"), None);
    }

    #[test]
    fn invalid_keys_rejected() {
        let mut store = PathStore::new();
        assert!(matches!(
            store.set("", json!(1)),
            Err(BinderyError::InvalidPath { .. })
        ));
        assert!(store.set("a..b", json!(1)).is_err());
        assert_eq!(store.get("a..b"), None);
    }

    #[test]
    fn custom_separator() {
        let mut store = PathStore::with_separator('/');
        store.set("a/b", json!(1)).unwrap();
        assert_eq!(store.get("a/b"), Some(&json!(1)));
        assert_eq!(store.get("a.b"), None);
    }

    // ═══════════════════════════════════════════════════════════════
    // Conflict policy
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn write_through_scalar_is_conflict() {
        let mut store = PathStore::new();
        store.set("a.b", json!(5)).unwrap();

        let err = store.set("a.b.c", json!(1)).unwrap_err();
        match err {
            BinderyError::PathConflict { segment, found, .. } => {
                assert_eq!(segment, "b");
                assert_eq!(found, "number");
            }
            other => panic!("expected PathConflict, got {other:?}"),
        }
        // Tree untouched
        assert_eq!(store.get("a.b"), Some(&json!(5)));
    }

    #[test]
    fn write_through_array_is_conflict() {
        let mut store = PathStore::new();
        store.set("list", json!([1, 2])).unwrap();
        assert!(matches!(
            store.set("list.0", json!(3)),
            Err(BinderyError::PathConflict { .. })
        ));
    }

    #[test]
    fn conflict_leaves_no_partial_path() {
        let mut store = PathStore::new();
        store.set("a.b", json!("text")).unwrap();
        assert!(store.ensure("a.b.c.d").is_err());
        assert_eq!(store.print().get("a"), Some(&json!({"b": "text"})));
    }

    #[test]
    fn null_intermediate_is_coerced() {
        let mut store = PathStore::new();
        store.set("a", Value::Null).unwrap();
        store.set("a.b", json!(1)).unwrap();
        assert_eq!(store.get("a"), Some(&json!({"b": 1})));
    }

    // ═══════════════════════════════════════════════════════════════
    // merge / print
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn merge_is_deep() {
        let mut target = json!({"a": {"y": 2}});
        let source = json!({"a": {"x": 1}});
        merge(
            target.as_object_mut().unwrap(),
            source.as_object().unwrap(),
        );
        assert_eq!(target, json!({"a": {"x": 1, "y": 2}}));
    }

    #[test]
    fn merge_replaces_non_objects() {
        let mut target = json!({"list": [1, 2, 3], "n": {"deep": true}, "s": "old"});
        let source = json!({"list": [9], "n": 4, "s": {"now": "object"}});
        merge(
            target.as_object_mut().unwrap(),
            source.as_object().unwrap(),
        );
        assert_eq!(
            target,
            json!({"list": [9], "n": 4, "s": {"now": "object"}})
        );
    }

    #[test]
    fn merge_document_into_root() {
        let mut store = PathStore::new();
        store.set("counter.input.value", json!(1)).unwrap();
        store
            .merge_document(&json!({"counter": {"title": "Counter"}}))
            .unwrap();

        assert_eq!(store.get("counter.input.value"), Some(&json!(1)));
        assert_eq!(store.get("counter.title"), Some(&json!("Counter")));
    }

    #[test]
    fn merge_document_rejects_non_object() {
        let mut store = PathStore::new();
        assert!(matches!(
            store.merge_document(&json!([1, 2])),
            Err(BinderyError::InvalidData { .. })
        ));
    }

    #[test]
    fn print_mut_is_live() {
        let mut store = PathStore::new();
        store
            .print_mut()
            .insert("direct".to_string(), json!("write"));
        assert_eq!(store.get("direct"), Some(&json!("write")));
    }
}
