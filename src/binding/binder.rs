//! Template Binder (v0.1)
//!
//! Walks a parsed fragment, finds `{{key}}` placeholders per family, writes
//! the current store values into the elements and registers each binding.
//!
//! For each element and each family (fixed order) the source text is the
//! first of these that holds a placeholder:
//! 1. the family's markup attribute (`id`, `class`, `value`, `checked`)
//! 2. the family's property (`innerHTML` for text)
//! 3. the family's marker attribute (`data-tpl-value="{{a.b}}"`)
//!
//! After binding, the marker attribute holds the resolved key and the
//! unique attribute holds the node's binder id.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::family::{Family, Markers};
use super::registry::{BinderId, BindingRegistry};
use super::template::{first_placeholder, namespace_of, qualify, strip_markup};
use crate::config::BinderConfig;
use crate::dom::{Document, FragmentParser, MarkupParser, NodeId};
use crate::store::Store;
use crate::util::display_value;

/// A fragment with its bindings
#[derive(Debug, Clone, Default)]
pub struct BoundDocument {
    document: Document,
    registry: BindingRegistry,
    namespace: Option<String>,
}

impl BoundDocument {
    /// Nothing to bind
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Namespace found by the last scan
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Node carrying binder `id`
    pub fn node_for(&self, id: BinderId) -> Option<NodeId> {
        self.registry.get(id).map(|entry| entry.node())
    }

    pub fn to_html(&self) -> String {
        self.document.to_html()
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Document, &BindingRegistry) {
        (&mut self.document, &self.registry)
    }
}

pub struct TemplateBinder {
    config: BinderConfig,
    markers: Markers,
    parser: Arc<dyn FragmentParser>,
}

impl TemplateBinder {
    pub fn new(config: BinderConfig) -> Self {
        Self::with_parser(config, Arc::new(MarkupParser))
    }

    /// Use a different markup parser
    pub fn with_parser(config: BinderConfig, parser: Arc<dyn FragmentParser>) -> Self {
        let markers = Markers::new(&config);
        Self {
            config,
            markers,
            parser,
        }
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn parser(&self) -> &Arc<dyn FragmentParser> {
        &self.parser
    }

    /// Parse and bind markup.
    ///
    /// A parse failure is logged and yields an empty document.
    #[instrument(skip_all, fields(len = markup.len()))]
    pub fn bind_markup(&self, markup: &str, store: &Store) -> BoundDocument {
        match self.parser.parse_fragment(markup) {
            Ok(document) => self.bind(document, store),
            Err(e) => {
                warn!(error = %e, "Template failed to parse, nothing to bind");
                BoundDocument::empty()
            }
        }
    }

    /// Bind an already parsed fragment
    pub fn bind(&self, document: Document, store: &Store) -> BoundDocument {
        let mut bound = BoundDocument {
            document,
            registry: BindingRegistry::new(),
            namespace: None,
        };
        self.scan(&mut bound, store);
        bound
    }

    /// Scan again for placeholders added since the last scan.
    ///
    /// Nodes that already carry a binder id keep it. Returns the number of
    /// family bindings made.
    pub fn rescan(&self, bound: &mut BoundDocument, store: &Store) -> usize {
        self.scan(bound, store)
    }

    fn scan(&self, bound: &mut BoundDocument, store: &Store) -> usize {
        let namespace = namespace_of(&bound.document);
        if namespace.is_some() {
            bound.namespace = namespace;
        }
        let separator = store.separator();
        let mut made = 0;

        for node in bound.document.elements() {
            for family in Family::ALL {
                // Text writes can detach later elements of this walk
                if !bound.document.is_attached(node) {
                    break;
                }
                let Some(source) = self.source_text(&bound.document, node, family) else {
                    continue;
                };
                if self.holds_written_value(bound, node, family, &source, store) {
                    continue;
                }
                let Some(expression) = first_placeholder(&strip_markup(&source)).map(str::to_string)
                else {
                    continue;
                };
                let key = qualify(&expression, bound.namespace.as_deref(), separator);

                let value = match store.ensure(&key) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(key = %key, family = %family, error = %e, "Skipping binding");
                        continue;
                    }
                };
                family.write(&mut bound.document, node, value.as_ref());

                let id = self.binder_id(bound, node);
                bound.registry.bind(id, family, &key);
                bound
                    .document
                    .set_attribute(node, self.markers.marker(family), &key);
                debug!(id = %id, family = %family, key = %key, "Bound");
                made += 1;
            }
        }
        made
    }

    fn source_text(&self, document: &Document, node: NodeId, family: Family) -> Option<String> {
        let attribute = family
            .source_attribute()
            .and_then(|name| document.attribute(node, name))
            .map(str::to_string);
        let property = || document.property(node, family.property());
        let marker = || {
            document
                .attribute(node, self.markers.marker(family))
                .map(str::to_string)
        };

        let holds = |text: &String| first_placeholder(&strip_markup(text)).is_some();
        attribute
            .filter(holds)
            .or_else(|| property().filter(holds))
            .or_else(|| marker().filter(holds))
    }

    /// Whether `source` is the store value this family already wrote to
    /// `node`, so a `{{...}}` inside stored data is not bound again
    fn holds_written_value(
        &self,
        bound: &BoundDocument,
        node: NodeId,
        family: Family,
        source: &str,
        store: &Store,
    ) -> bool {
        let Some(key) = bound
            .document
            .attribute(node, self.markers.unique())
            .and_then(BinderId::parse)
            .and_then(|id| bound.registry.entry_for_node(id, node))
            .and_then(|entry| entry.key_for(family))
        else {
            return false;
        };
        if bound.document.attribute(node, self.markers.marker(family)) != Some(key) {
            return false;
        }
        // innerHTML is serialized markup; the store value was written as text
        let current = match family {
            Family::Text => Cow::Owned(bound.document.text_content(node)),
            _ => Cow::Borrowed(source),
        };
        store
            .get(key)
            .is_some_and(|value| display_value(&value) == current)
    }

    /// Existing id of `node`, or a fresh one written to its unique attribute
    fn binder_id(&self, bound: &mut BoundDocument, node: NodeId) -> BinderId {
        let existing = bound
            .document
            .attribute(node, self.markers.unique())
            .and_then(BinderId::parse)
            .filter(|id| bound.registry.entry_for_node(*id, node).is_some());
        if let Some(id) = existing {
            return id;
        }

        let id = bound.registry.allocate(node);
        bound
            .document
            .set_attribute(node, self.markers.unique(), &id.to_string());
        id
    }
}

impl std::fmt::Debug for TemplateBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateBinder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
