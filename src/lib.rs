//! Bindery - reactive two-way data binding between a key-value store and HTML
//!
//! Layers, bottom-up:
//! - `util`: key paths, JSON truthiness and display
//! - `event`: topic-based `ChangeBus` and `ChangeEvent`
//! - `store`: nested `PathStore` and the publishing `Store`
//! - `dom`: arena `Document`, markup parser and serializer
//! - `binding`: placeholder discovery and the binding registry
//! - `reconcile`: store changes back into bound views
//! - `engine`: the wired-up façade
//! - `render`: component fetching and page assembly

pub mod binding;
pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod event;
pub mod reconcile;
pub mod render;
pub mod store;
pub mod util;

pub use binding::{BinderId, BoundDocument, Family, TemplateBinder};
pub use config::BinderConfig;
pub use dom::{Document, FragmentParser, MarkupParser, NodeId};
pub use engine::{Engine, UserInput};
pub use error::{BinderyError, FixSuggestion, Result};
pub use event::{ChangeBus, ChangeEvent, Topic};
pub use reconcile::{ReconciliationListener, SharedView};
pub use render::{ComponentRenderer, FsFetcher, HttpFetcher, ResourceFetcher};
pub use store::{Store, Update};
