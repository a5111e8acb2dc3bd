//! Reconciliation - store changes back into bound views (v0.1)
//!
//! Two bus listeners close the loop:
//! - `StoreChanged` → every node bound to exactly that key is rewritten
//! - `PresentationChanged` → `Store::set`, which publishes `StoreChanged`
//!
//! ```text
//! user input ──PresentationChanged──▶ Store::set
//!      ▲                                  │
//!      │                            StoreChanged
//!      └──── view rewritten ◀─────────────┘
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::binding::{BoundDocument, Family, Markers};
use crate::config::BinderConfig;
use crate::event::{ChangeEvent, SubscriptionId, Topic};
use crate::store::Store;

/// A bound view shared with its reconciliation listener.
///
/// Do not hold the lock while writing to the store: the listener locks the
/// view on the writing thread.
pub type SharedView = Arc<Mutex<BoundDocument>>;

pub struct ReconciliationListener;

impl ReconciliationListener {
    /// Keep `view` in sync with `store`
    pub fn attach(store: &Store, view: SharedView, config: &BinderConfig) -> SubscriptionId {
        let markers = Markers::new(config);
        store
            .bus()
            .subscribe(Topic::StoreChanged, move |event: &ChangeEvent| {
                if let ChangeEvent::StoreChanged { key, value } = event {
                    let mut bound = view.lock();
                    Self::apply(&mut bound, &markers, key, value);
                }
                Ok(())
            })
    }

    /// Forward presentation changes into `store`.
    ///
    /// The listener holds a weak reference and goes quiet once the store is
    /// dropped.
    pub fn install_forwarding(store: &Arc<Store>) -> SubscriptionId {
        let weak = Arc::downgrade(store);
        store
            .bus()
            .subscribe(Topic::PresentationChanged, move |event: &ChangeEvent| {
                let Some(store) = weak.upgrade() else {
                    return Ok(());
                };
                if let ChangeEvent::PresentationChanged { key, value } = event {
                    store.set(key, value.clone())?;
                }
                Ok(())
            })
    }

    /// Rewrite every family bound to exactly `key`. Returns the number of writes.
    ///
    /// Detached nodes and nodes whose unique attribute no longer names their
    /// entry are skipped.
    pub fn apply(bound: &mut BoundDocument, markers: &Markers, key: &str, value: &Value) -> usize {
        let (document, registry) = bound.parts_mut();
        let mut writes = 0;

        for entry in registry.entries_for(key) {
            let node = entry.node();
            let id = entry.id().to_string();
            if !document.is_attached(node)
                || document.attribute(node, markers.unique()) != Some(id.as_str())
            {
                trace!(id = %id, key, "Skipping stale binding");
                continue;
            }
            for family in Family::ALL {
                if document.attribute(node, markers.marker(family)) == Some(key) {
                    family.write(document, node, Some(value));
                    writes += 1;
                }
            }
        }

        if writes > 0 {
            debug!(key, writes, "View reconciled");
        }
        writes
    }
}
