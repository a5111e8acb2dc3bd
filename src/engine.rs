//! Engine - store, binder and reconciliation wired together (v0.1)
//!
//! ```text
//! Engine
//! ├── Arc<Store>           (owns the ChangeBus)
//! ├── TemplateBinder       (markup → BoundDocument)
//! └── forwarding listener  (PresentationChanged → Store::set)
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::binding::{BoundDocument, Family, TemplateBinder};
use crate::config::BinderConfig;
use crate::dom::NodeId;
use crate::error::Result;
use crate::event::{ChangeEvent, Delivery, SubscriptionId};
use crate::reconcile::{ReconciliationListener, SharedView};
use crate::store::{Store, Update};
use crate::util::display_value;

/// An edit made by the user on a bound form element
#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    /// Typed text (value family)
    Text(String),
    /// Toggled checkbox or radio (checked family)
    Checked(bool),
}

impl UserInput {
    fn family(&self) -> Family {
        match self {
            Self::Text(_) => Family::Value,
            Self::Checked(_) => Family::Checked,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Text(text) => Value::String(text),
            Self::Checked(checked) => Value::Bool(checked),
        }
    }
}

pub struct Engine {
    config: BinderConfig,
    store: Arc<Store>,
    binder: TemplateBinder,
    forwarding: SubscriptionId,
}

impl Engine {
    pub fn new(config: BinderConfig) -> Self {
        let store = Arc::new(Store::with_separator(config.notation));
        Self::with_store(config, store)
    }

    /// Share an existing store
    pub fn with_store(config: BinderConfig, store: Arc<Store>) -> Self {
        let forwarding = ReconciliationListener::install_forwarding(&store);
        let binder = TemplateBinder::new(config.clone());
        Self {
            config,
            store,
            binder,
            forwarding,
        }
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn binder(&self) -> &TemplateBinder {
        &self.binder
    }

    /// Subscription id of the presentation forwarding listener
    pub fn forwarding(&self) -> SubscriptionId {
        self.forwarding
    }

    pub fn set(&self, key: &str, update: impl Into<Update>) -> Result<Option<Value>> {
        self.store.set(key, update)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }

    /// Parse, bind and attach markup
    pub fn bind_markup(&self, markup: &str) -> SharedView {
        let bound = self.binder.bind_markup(markup, &self.store);
        self.attach(bound)
    }

    /// Subscribe a bound document to store changes
    pub fn attach(&self, bound: BoundDocument) -> SharedView {
        let view = Arc::new(Mutex::new(bound));
        ReconciliationListener::attach(&self.store, Arc::clone(&view), &self.config);
        view
    }

    /// Bind placeholders added to an attached view since it was bound
    pub fn rescan(&self, view: &SharedView) -> usize {
        // Gate before view: reconciliation locks views while holding the gate
        self.store.with_gate(|| {
            let mut bound = view.lock();
            self.binder.rescan(&mut bound, &self.store)
        })
    }

    /// Apply a user edit to `node` and publish it.
    ///
    /// Returns `None` when the node has no binding for the edited family.
    pub fn input(&self, view: &SharedView, node: NodeId, input: UserInput) -> Option<Delivery> {
        let family = input.family();
        let event = {
            let mut bound = view.lock();
            let document = bound.document_mut();
            let element = document.element_mut(node)?;
            match &input {
                UserInput::Text(text) => element.set_value(text),
                UserInput::Checked(checked) => element.set_checked(*checked),
            }
            let key = element.attribute(self.binder.markers().marker(family))?;
            ChangeEvent::presentation_changed(key, input.into_value())
        };
        debug!(key = event.key(), "Presentation changed");
        // View lock released: reconciliation locks it again
        Some(self.store.bus().publish(&event))
    }

    /// Element whose `id` equals the string stored at `key`
    pub fn element_for(&self, view: &SharedView, key: &str) -> Option<NodeId> {
        let id = display_value(&self.store.get(key)?);
        if id.is_empty() {
            return None;
        }
        view.lock().document().element_by_id(&id)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(BinderConfig::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
