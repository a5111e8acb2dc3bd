//! Render Module - component loading and page assembly (v0.1)
//!
//! - `fetch`: `ResourceFetcher` seam with filesystem and HTTP implementations
//! - `component`: `ComponentRenderer` (data merge, view binding, assets)

mod component;
mod fetch;

pub use component::{ComponentRenderer, RenderedComponent, RenderedPage};
pub use fetch::{FsFetcher, HttpFetcher, ResourceFetcher};
