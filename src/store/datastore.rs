//! Store - shared, publishing wrapper around `PathStore` (v0.1)
//!
//! Every `set` runs `mutate → publish → listeners` as one step behind a
//! re-entrant gate: other threads wait for the whole cycle, while listeners on
//! the publishing thread may read or write the store again (the
//! presentation-changed loop does exactly that).

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use serde_json::{Map, Value};
use tracing::debug;

use super::paths::{PathStore, Update};
use crate::error::Result;
use crate::event::{ChangeBus, ChangeEvent};

/// Shared key-value store that announces its mutations
pub struct Store {
    paths: ReentrantMutex<RefCell<PathStore>>,
    bus: Arc<ChangeBus<ChangeEvent>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store with its own bus
    pub fn new() -> Self {
        Self::from_paths(PathStore::new(), Arc::new(ChangeBus::new()))
    }

    /// Create an empty store using a custom notation separator
    pub fn with_separator(separator: char) -> Self {
        Self::from_paths(PathStore::with_separator(separator), Arc::new(ChangeBus::new()))
    }

    /// Wrap an existing tree and bus
    pub fn from_paths(paths: PathStore, bus: Arc<ChangeBus<ChangeEvent>>) -> Self {
        Self {
            paths: ReentrantMutex::new(RefCell::new(paths)),
            bus,
        }
    }

    /// The bus this store publishes on
    pub fn bus(&self) -> &Arc<ChangeBus<ChangeEvent>> {
        &self.bus
    }

    pub fn separator(&self) -> char {
        self.paths.lock().borrow().separator()
    }

    /// Write `update` at `key` and publish `StoreChanged`
    ///
    /// Object values publish one event per first-level child (`key.child`)
    /// instead of one for `key`; deeper descendants are not announced.
    pub fn set(&self, key: &str, update: impl Into<Update>) -> Result<Option<Value>> {
        let gate = self.paths.lock();

        let update = update.into();
        // Updaters run with no borrow held so they may read the store
        let update = if matches!(update, Update::Apply(_)) {
            let prior = gate.borrow().get(key).cloned();
            update.resolve(prior.as_ref())
        } else {
            update
        };

        let (value, separator) = {
            let mut paths = gate.borrow_mut();
            (paths.set(key, update)?, paths.separator())
        };
        debug!(key, ?value, "Store updated");

        match &value {
            Some(Value::Object(children)) => {
                for (child, child_value) in children {
                    self.bus.publish(&ChangeEvent::store_changed(
                        format!("{key}{separator}{child}"),
                        child_value.clone(),
                    ));
                }
            }
            other => {
                self.bus.publish(&ChangeEvent::store_changed(
                    key,
                    other.clone().unwrap_or(Value::Null),
                ));
            }
        }

        Ok(value)
    }

    /// Read `key` (cloned); `None` when any segment is missing
    pub fn get(&self, key: &str) -> Option<Value> {
        self.paths.lock().borrow().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.paths.lock().borrow().contains(key)
    }

    /// Create the intermediate objects of `key` without a value or event
    pub fn ensure(&self, key: &str) -> Result<Option<Value>> {
        self.paths.lock().borrow_mut().ensure(key)
    }

    /// Deep-merge an object document into the root (no events)
    pub fn merge(&self, source: &Value) -> Result<()> {
        self.paths.lock().borrow_mut().merge_document(source)
    }

    /// Run `f` while holding the store gate.
    ///
    /// `f` may call back into this store. Anything else locked inside `f`
    /// (a view, for instance) is then always taken after the gate, the same
    /// order `set` uses when listeners reconcile.
    pub fn with_gate<R>(&self, f: impl FnOnce() -> R) -> R {
        let _gate = self.paths.lock();
        f()
    }

    /// Run `f` on the live root mapping
    ///
    /// `f` must not call back into this store.
    pub fn with_root<R>(&self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        let gate = self.paths.lock();
        let mut paths = gate.borrow_mut();
        f(paths.print_mut())
    }

    /// Copy of the whole tree
    pub fn snapshot(&self) -> Value {
        Value::Object(self.paths.lock().borrow().print().clone())
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("keys", &self.paths.lock().borrow().print().len())
            .field("bus", &self.bus)
            .finish()
    }
}
