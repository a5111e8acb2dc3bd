//! Document - arena-backed node tree
//!
//! Nodes are never freed: removing a subtree only detaches it, so a `NodeId`
//! stays valid (and keeps pointing at the same node) for the document's
//! lifetime.

use super::serialize;

/// Index of a node inside its `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// The fragment root (exactly one per document)
    Fragment,
    Element(Element),
    Text(String),
    Comment(String),
}

/// Element node
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    /// Live `value` (edited by the user, not serialized)
    live_value: Option<String>,
    /// Live `checked` state (edited by the user, not serialized)
    live_checked: Option<bool>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Attributes in source order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => {
                existing.clear();
                existing.push_str(value);
            }
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|(n, _)| n != name);
        self.attributes.len() != before
    }

    /// `type` attribute of an `<input>`, lowercased
    pub fn input_type(&self) -> Option<String> {
        if self.tag != "input" {
            return None;
        }
        Some(
            self.attribute("type")
                .unwrap_or("text")
                .to_ascii_lowercase(),
        )
    }

    pub fn is_checkbox(&self) -> bool {
        matches!(self.input_type().as_deref(), Some("checkbox" | "radio"))
    }

    /// Current form value: live state, else the `value` attribute
    pub fn value(&self) -> Option<&str> {
        self.live_value.as_deref().or_else(|| self.attribute("value"))
    }

    /// Current checked state: live state, else presence of `checked`
    pub fn checked(&self) -> bool {
        self.live_checked
            .unwrap_or_else(|| self.has_attribute("checked"))
    }

    pub fn set_value(&mut self, value: &str) {
        self.live_value = Some(value.to_string());
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.live_checked = Some(checked);
    }

    /// Drop the live state behind `property` so it follows markup again
    pub fn reset_live(&mut self, property: Property) {
        match property {
            Property::Value => self.live_value = None,
            Property::Checked => self.live_checked = None,
            Property::Id | Property::ClassName | Property::InnerHtml => {}
        }
    }
}

/// Element properties a binding can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Id,
    ClassName,
    InnerHtml,
    Value,
    Checked,
}

impl Property {
    /// Script-side property name
    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ClassName => "className",
            Self::InnerHtml => "innerHTML",
            Self::Value => "value",
            Self::Checked => "checked",
        }
    }

    /// Markup attribute the property reflects, if any
    pub fn attribute_name(self) -> Option<&'static str> {
        match self {
            Self::Id => Some("id"),
            Self::ClassName => Some("class"),
            Self::InnerHtml => None,
            Self::Value => Some("value"),
            Self::Checked => Some("checked"),
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Parsed document fragment
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty fragment
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Fragment,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// True when the fragment root has no children
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    // ═══════════════════════════════════════════
    // Construction
    // ═══════════════════════════════════════════

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeData::Element(element))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    /// Append `child` as last child of `parent` (detaching it first)
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    /// Insert `child` at `index` among `parent`'s children
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() || child == parent {
            return;
        }
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Detach `node` from its parent (the node itself stays addressable)
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != node);
        self.nodes[node.0].parent = None;
    }

    /// Detach every child of `node`
    pub fn clear_children(&mut self, node: NodeId) {
        let children = match self.nodes.get_mut(node.0) {
            Some(n) => std::mem::take(&mut n.children),
            None => return,
        };
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Deep-copy the top-level nodes of `other` under `parent`
    pub fn import(&mut self, parent: NodeId, other: &Document) {
        for child in other.children(other.root()).to_vec() {
            let copy = self.copy_from(other, child);
            self.append_child(parent, copy);
        }
    }

    fn copy_from(&mut self, other: &Document, node: NodeId) -> NodeId {
        let data = other.nodes[node.0].data.clone();
        let copy = self.push(data);
        for child in other.children(node).to_vec() {
            let child_copy = self.copy_from(other, child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    // ═══════════════════════════════════════════
    // Navigation
    // ═══════════════════════════════════════════

    pub fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.0).map(|n| &n.data)
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match self.data(node)? {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node.0)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Descendants of `node` in document order (pre-order, `node` excluded)
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Every attached element, in document order
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.element(*id).is_some())
            .collect()
    }

    /// Concatenated text of every text node under `node`
    pub fn text_content(&self, node: NodeId) -> String {
        self.descendants(node)
            .into_iter()
            .filter_map(|id| match self.data(id) {
                Some(NodeData::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every attached comment's text, in document order
    pub fn comments(&self) -> Vec<&str> {
        self.descendants(self.root())
            .into_iter()
            .filter_map(|id| match self.data(id) {
                Some(NodeData::Comment(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// True when `node` is reachable from the fragment root
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root() {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// First attached element whose `name` attribute equals `value`
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|id| self.attribute(*id, name) == Some(value))
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_by_attribute("id", id)
    }

    /// Attached elements with tag `tag`, in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|e| e.tag() == tag))
            .collect()
    }

    // ═══════════════════════════════════════════
    // Attributes and properties
    // ═══════════════════════════════════════════

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attribute(name)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            element.set_attribute(name, value);
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> bool {
        self.element_mut(node)
            .is_some_and(|element| element.remove_attribute(name))
    }

    /// Read a property (`None` for non-elements or an unset `id`)
    pub fn property(&self, node: NodeId, property: Property) -> Option<String> {
        let element = self.element(node)?;
        match property {
            Property::Id => element.attribute("id").map(str::to_string),
            Property::ClassName => Some(element.attribute("class").unwrap_or("").to_string()),
            Property::InnerHtml => Some(self.inner_html(node)),
            Property::Value => Some(element.value().unwrap_or("").to_string()),
            Property::Checked => Some(element.checked().to_string()),
        }
    }

    /// Write a property
    ///
    /// `InnerHtml` replaces the children with a single text node; the text is
    /// not parsed as markup.
    pub fn set_property(&mut self, node: NodeId, property: Property, value: &str) {
        match property {
            Property::Id => self.set_attribute(node, "id", value),
            Property::ClassName => self.set_attribute(node, "class", value),
            Property::InnerHtml => {
                if self.element(node).is_none() {
                    return;
                }
                self.clear_children(node);
                if !value.is_empty() {
                    let text = self.create_text(value);
                    self.append_child(node, text);
                }
            }
            Property::Value => {
                if let Some(element) = self.element_mut(node) {
                    element.set_value(value);
                }
            }
            Property::Checked => {
                if let Some(element) = self.element_mut(node) {
                    element.set_checked(!value.is_empty() && value != "false");
                }
            }
        }
    }

    // ═══════════════════════════════════════════
    // Serialization
    // ═══════════════════════════════════════════

    /// Markup of `node`'s children
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            serialize::write_node(self, *child, &mut out);
        }
        out
    }

    /// Markup of `node` itself
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        serialize::write_node(self, node, &mut out);
        out
    }

    /// Markup of the whole fragment
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }
}
