//! Binding Module - template placeholders to store keys (v0.1)
//!
//! - `family`: Bindable element state and its write convention
//! - `template`: Placeholder, markup stripping and namespace helpers
//! - `registry`: Binder ids, bound nodes and the key index
//! - `binder`: `TemplateBinder` producing a `BoundDocument`
//!
//! Data flow:
//! ```text
//! markup → FragmentParser → Document
//!                              ↓
//!              TemplateBinder scan (per element × family)
//!                              ↓
//!        store values written, markers + unique id set
//!                              ↓
//!            BoundDocument { Document, BindingRegistry }
//! ```

mod binder;
mod family;
mod registry;
mod template;

// Re-export public types
pub use binder::{BoundDocument, TemplateBinder};
pub use family::{Backing, Capability, Family, Markers};
pub use registry::{AttributeBinding, BinderId, BindingEntry, BindingRegistry};
pub use template::{first_placeholder, has_placeholder, namespace_of, qualify, strip_markup};
