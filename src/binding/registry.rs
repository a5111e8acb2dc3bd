//! Binding Registry (v0.1)
//!
//! Maps binder ids to bound nodes and storage keys to binder ids.
//! Ids are allocated on a node's first binding and never reused.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::family::Family;
use crate::dom::NodeId;

/// Identifier stored in a node's unique attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BinderId(usize);

impl BinderId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Parse the unique attribute's text
    pub fn parse(text: &str) -> Option<Self> {
        text.trim().parse().ok().map(Self)
    }
}

impl fmt::Display for BinderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One family of one node bound to one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeBinding {
    pub family: Family,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct BindingEntry {
    id: BinderId,
    node: NodeId,
    attributes: Vec<AttributeBinding>,
    keys: Vec<String>,
}

impl BindingEntry {
    pub fn id(&self) -> BinderId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Bound families in binding order
    pub fn attributes(&self) -> &[AttributeBinding] {
        &self.attributes
    }

    /// Distinct keys the node depends on
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn key_for(&self, family: Family) -> Option<&str> {
        self.attributes
            .iter()
            .find(|binding| binding.family == family)
            .map(|binding| binding.key.as_str())
    }

    /// Families of this node bound to `key`
    pub fn families_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = Family> + 'a {
        self.attributes
            .iter()
            .filter(move |binding| binding.key == key)
            .map(|binding| binding.family)
    }

    fn rebuild_keys(&mut self) {
        self.keys.clear();
        for binding in &self.attributes {
            if !self.keys.contains(&binding.key) {
                self.keys.push(binding.key.clone());
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BindingRegistry {
    entries: Vec<BindingEntry>,
    by_key: FxHashMap<String, Vec<BinderId>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Allocate a fresh id for `node`
    pub fn allocate(&mut self, node: NodeId) -> BinderId {
        let id = BinderId(self.entries.len());
        self.entries.push(BindingEntry {
            id,
            node,
            attributes: Vec::new(),
            keys: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: BinderId) -> Option<&BindingEntry> {
        self.entries.get(id.0)
    }

    /// Bind `family` of entry `id` to `key`.
    ///
    /// Rebinding a family replaces its key. Returns the replaced key.
    pub fn bind(&mut self, id: BinderId, family: Family, key: &str) -> Option<String> {
        let entry = self.entries.get_mut(id.0)?;

        let previous = match entry.attributes.iter().position(|b| b.family == family) {
            Some(i) if entry.attributes[i].key == key => return None,
            Some(i) => Some(std::mem::replace(
                &mut entry.attributes[i].key,
                key.to_string(),
            )),
            None => {
                entry.attributes.push(AttributeBinding {
                    family,
                    key: key.to_string(),
                });
                None
            }
        };
        entry.rebuild_keys();

        if let Some(old) = previous.as_deref() {
            if !entry.keys.iter().any(|k| k == old) {
                if let Some(ids) = self.by_key.get_mut(old) {
                    ids.retain(|other| *other != id);
                    if ids.is_empty() {
                        self.by_key.remove(old);
                    }
                }
            }
        }

        let ids = self.by_key.entry(key.to_string()).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
        previous
    }

    /// Entries bound to exactly `key`, in allocation order
    pub fn entries_for(&self, key: &str) -> impl Iterator<Item = &BindingEntry> {
        self.by_key
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(|id| self.entries.get(id.0))
    }

    pub fn entries(&self) -> &[BindingEntry] {
        &self.entries
    }

    /// Every bound key, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.by_key.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Entry of the node carrying `id`, checked against the node
    pub fn entry_for_node(&self, id: BinderId, node: NodeId) -> Option<&BindingEntry> {
        self.get(id).filter(|entry| entry.node == node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, Element};

    fn nodes(count: usize) -> Vec<NodeId> {
        let mut doc = Document::new();
        (0..count)
            .map(|_| doc.create_element(Element::new("p")))
            .collect()
    }

    #[test]
    fn ids_are_allocated_in_order() {
        let n = nodes(2);
        let mut registry = BindingRegistry::new();
        let a = registry.allocate(n[0]);
        let b = registry.allocate(n[1]);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(BinderId::parse(&b.to_string()), Some(b));
        assert_eq!(BinderId::parse("x"), None);
    }

    #[test]
    fn entries_for_matches_exact_keys() {
        let n = nodes(2);
        let mut registry = BindingRegistry::new();
        let a = registry.allocate(n[0]);
        let b = registry.allocate(n[1]);
        registry.bind(a, Family::Text, "user.name");
        registry.bind(b, Family::Value, "user.name");
        registry.bind(b, Family::Class, "user");

        let bound: Vec<BinderId> = registry.entries_for("user.name").map(|e| e.id()).collect();
        assert_eq!(bound, vec![a, b]);
        assert_eq!(registry.entries_for("user").count(), 1);
        assert_eq!(registry.entries_for("user.na").count(), 0);
    }

    #[test]
    fn rebinding_a_family_replaces_its_key() {
        let n = nodes(1);
        let mut registry = BindingRegistry::new();
        let id = registry.allocate(n[0]);
        assert_eq!(registry.bind(id, Family::Text, "old"), None);
        assert_eq!(registry.bind(id, Family::Text, "new"), Some("old".to_string()));

        let entry = registry.get(id).unwrap();
        assert_eq!(entry.key_for(Family::Text), Some("new"));
        assert_eq!(entry.keys(), ["new".to_string()]);
        assert_eq!(registry.entries_for("old").count(), 0);
        assert_eq!(registry.keys(), vec!["new"]);
    }

    #[test]
    fn shared_key_survives_rebinding_one_family() {
        let n = nodes(1);
        let mut registry = BindingRegistry::new();
        let id = registry.allocate(n[0]);
        registry.bind(id, Family::Id, "k");
        registry.bind(id, Family::Value, "k");
        registry.bind(id, Family::Value, "other");

        assert_eq!(registry.entries_for("k").count(), 1);
        let entry = registry.get(id).unwrap();
        assert_eq!(entry.keys(), ["k".to_string(), "other".to_string()]);
        assert_eq!(entry.families_for("k").collect::<Vec<_>>(), vec![Family::Id]);
    }

    #[test]
    fn entry_for_node_checks_node() {
        let n = nodes(2);
        let mut registry = BindingRegistry::new();
        let id = registry.allocate(n[0]);
        assert!(registry.entry_for_node(id, n[0]).is_some());
        assert!(registry.entry_for_node(id, n[1]).is_none());
    }
}
