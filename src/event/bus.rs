//! ChangeBus - synchronous topic-based publish/subscribe (v0.1)
//!
//! - Listeners run in registration order, on the publishing thread.
//! - Publishing to a topic nobody listens to is a silent no-op.
//! - A failing listener (error or panic) is logged and skipped; the rest of
//!   the topic still receives the event.
//! - The listener list is snapshotted before delivery, so listeners may
//!   publish or subscribe re-entrantly.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;

use super::kind::BusEvent;
use crate::error::Result;

/// Listener callback
pub type Listener<E> = dyn Fn(&E) -> Result<()> + Send + Sync;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Outcome of one publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Listeners that ran to completion
    pub delivered: usize,
    /// Listeners that returned an error or panicked
    pub failed: usize,
}

impl Delivery {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

type Subscriber<E> = (SubscriptionId, Arc<Listener<E>>);

/// Topic-agnostic publish/subscribe bus
pub struct ChangeBus<E: BusEvent> {
    topics: DashMap<E::Topic, Vec<Subscriber<E>>>,
    next_id: AtomicU64,
}

impl<E: BusEvent> Default for ChangeBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> ChangeBus<E> {
    pub fn new() -> Self {
        Self {
            topics: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register `listener` under `topic`
    pub fn subscribe<F>(&self, topic: E::Topic, listener: F) -> SubscriptionId
    where
        F: Fn(&E) -> Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let listener: Arc<Listener<E>> = Arc::new(listener);
        self.topics.entry(topic).or_default().push((id, listener));
        id
    }

    /// Remove a listener; returns false if it was not registered under `topic`
    pub fn unsubscribe(&self, topic: E::Topic, id: SubscriptionId) -> bool {
        let Some(mut subscribers) = self.topics.get_mut(&topic) else {
            return false;
        };
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    /// Number of listeners registered under `topic`
    pub fn listener_count(&self, topic: E::Topic) -> usize {
        self.topics.get(&topic).map_or(0, |subs| subs.len())
    }

    /// Deliver `event` to every listener of its topic
    pub fn publish(&self, event: &E) -> Delivery {
        let topic = event.topic();

        // Snapshot, then release the shard guard before running listeners
        let listeners: Vec<Arc<Listener<E>>> = match self.topics.get(&topic) {
            Some(subs) => subs.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => return Delivery::default(),
        };

        let mut delivery = Delivery::default();
        for listener in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => delivery.delivered += 1,
                Ok(Err(e)) => {
                    warn!(?topic, error = %e, "Listener failed, continuing delivery");
                    delivery.failed += 1;
                }
                Err(_) => {
                    warn!(?topic, "Listener panicked, continuing delivery");
                    delivery.failed += 1;
                }
            }
        }
        delivery
    }
}

impl<E: BusEvent> fmt::Debug for ChangeBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus")
            .field("topics", &self.topics.len())
            .finish()
    }
}
