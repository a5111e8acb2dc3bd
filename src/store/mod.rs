//! Store Module - state management (v0.1)
//!
//! Nested key-value storage addressed by dotted keys.
//!
//! Key types:
//! - `PathStore`: Plain nested tree with dotted get/set/merge (no side effects)
//! - `Store`: Shared, serialized store that publishes `StoreChanged` on every set
//! - `Update`: Keep / replace / functional update of a slot

mod datastore;
mod paths;

// Re-export all public types
pub use datastore::Store;
pub use paths::{merge, PathStore, Update, Updater};
