//! Component rendering (v0.1)
//!
//! A component is a folder `<root>/<id>/` holding `index.html` (view),
//! `index.json` (data), `index.css` and `index.js`. Rendering:
//!
//! 1. fetch data and view concurrently
//! 2. deep-merge each top-level object of the data document into the store
//!    root (skipped on failure)
//! 3. bind the view (a failed view fails the render)
//! 4. prepend a stylesheet link and append a script tag
//!
//! Pages embed components with `<tpl id="counter"></tpl>` placeholders.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::fetch::ResourceFetcher;
use crate::binding::BoundDocument;
use crate::dom::{Document, Element, FragmentParser, NodeId};
use crate::engine::Engine;
use crate::error::{BinderyError, Result};
use crate::reconcile::SharedView;
use crate::util::type_name;

/// A rendered, attached component
#[derive(Debug, Clone)]
pub struct RenderedComponent {
    pub id: String,
    pub view: SharedView,
    /// Whether the data document reached the store
    pub data_merged: bool,
}

impl RenderedComponent {
    pub fn to_html(&self) -> String {
        self.view.lock().to_html()
    }
}

/// A page with its component placeholders
#[derive(Debug, Clone)]
pub struct RenderedPage {
    document: Document,
    components: Vec<(NodeId, RenderedComponent)>,
    failed: Vec<String>,
}

impl RenderedPage {
    pub fn components(&self) -> impl Iterator<Item = &RenderedComponent> {
        self.components.iter().map(|(_, component)| component)
    }

    /// Ids of placeholders whose component failed to render
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Page markup with every component's current view grafted in
    pub fn to_html(&self) -> String {
        let mut document = self.document.clone();
        for (slot, component) in &self.components {
            document.clear_children(*slot);
            document.import(*slot, component.view.lock().document());
        }
        document.to_html()
    }
}

pub struct ComponentRenderer {
    engine: Arc<Engine>,
    fetcher: Arc<dyn ResourceFetcher>,
}

impl ComponentRenderer {
    pub fn new(engine: Arc<Engine>, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self { engine, fetcher }
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Render component `id` and attach its view to the store
    #[instrument(skip(self))]
    pub async fn render(&self, id: &str) -> Result<RenderedComponent> {
        let config = self.engine.config();
        let data_path = config.resource_path(id, &config.extensions.data);
        let view_path = config.resource_path(id, &config.extensions.view);

        let (data, view) = futures::join!(
            self.fetcher.fetch_text(&data_path),
            self.fetcher.fetch_text(&view_path)
        );

        let data_merged = match data {
            Ok(text) => self.merge_data(id, &text),
            Err(e) => {
                debug!(component = id, error = %e, "No component data, skipping merge");
                false
            }
        };

        let markup = view?;
        let mut bound = self.engine.binder().bind_markup(&markup, self.engine.store());
        if !bound.is_empty() {
            self.add_assets(&mut bound, id);
        }
        info!(component = id, bindings = bound.registry().len(), "Component rendered");

        Ok(RenderedComponent {
            id: id.to_string(),
            view: self.engine.attach(bound),
            data_merged,
        })
    }

    /// Render every `<tpl id>` placeholder of a page.
    ///
    /// A failing component is logged and its placeholder left empty.
    #[instrument(skip_all)]
    pub async fn render_page(&self, markup: &str) -> Result<RenderedPage> {
        let mut document = self.engine.binder().parser().parse_fragment(markup)?;
        let mut components = Vec::new();
        let mut failed = Vec::new();

        for slot in document.elements_by_tag(&self.engine.config().root_element) {
            let Some(id) = document.attribute(slot, "id").map(str::to_string) else {
                warn!("Component placeholder without id, skipping");
                continue;
            };
            document.clear_children(slot);
            match self.render(&id).await {
                Ok(component) => components.push((slot, component)),
                Err(e) => {
                    warn!(component = %id, error = %e, "Component failed to render");
                    failed.push(id);
                }
            }
        }

        Ok(RenderedPage {
            document,
            components,
            failed,
        })
    }

    /// Merge each top-level object of the data document into the store root
    fn merge_data(&self, id: &str, text: &str) -> bool {
        let result = serde_json::from_str::<Value>(text)
            .map_err(BinderyError::from)
            .and_then(|document| match document {
                Value::Object(sections) => {
                    for (section, value) in &sections {
                        if value.is_object() {
                            self.engine.store().merge(value)?;
                        } else {
                            debug!(component = id, section = %section, "Skipping non-object data section");
                        }
                    }
                    Ok(())
                }
                other => Err(BinderyError::InvalidData {
                    found: type_name(&other).to_string(),
                }),
            });
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(component = id, error = %e, "Component data not merged");
                false
            }
        }
    }

    fn add_assets(&self, bound: &mut BoundDocument, id: &str) {
        let config = self.engine.config();
        let base = format!("{}/", config.components_root.trim_end_matches('/'));

        let mut link = Element::new("link");
        link.set_attribute("rel", "stylesheet");
        link.set_attribute("type", "text/css");
        link.set_attribute(
            "href",
            &format!("{}{}", base, config.resource_path(id, &config.extensions.styles)),
        );

        let mut script = Element::new("script");
        script.set_attribute("type", "text/javascript");
        script.set_attribute(
            "src",
            &format!("{}{}", base, config.resource_path(id, &config.extensions.script)),
        );

        let document = bound.document_mut();
        let root = document.root();
        let link = document.create_element(link);
        document.insert_child(root, 0, link);
        let script = document.create_element(script);
        document.append_child(root, script);
    }
}

impl std::fmt::Debug for ComponentRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRenderer")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BinderConfig;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;

    /// In-memory resources keyed by path
    struct MapFetcher(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl ResourceFetcher for MapFetcher {
        async fn fetch_text(&self, path: &str) -> Result<String> {
            self.0
                .get(path)
                .map(|text| text.to_string())
                .ok_or_else(|| BinderyError::ResourceFailure {
                    url: path.to_string(),
                    status: 404,
                })
        }
    }

    fn renderer(files: &[(&'static str, &'static str)]) -> ComponentRenderer {
        let engine = Arc::new(Engine::new(BinderConfig::default()));
        ComponentRenderer::new(engine, Arc::new(MapFetcher(files.iter().copied().collect())))
    }

    #[tokio::test]
    async fn render_merges_data_and_binds_view() {
        let renderer = renderer(&[
            ("counter/index.json", r#"{"data": {"counter": {"value": 3}}}"#),
            ("counter/index.html", "<p>{{counter.value}}</p>"),
        ]);
        let component = renderer.render("counter").await.unwrap();

        assert!(component.data_merged);
        assert_eq!(
            component.to_html(),
            concat!(
                r#"<link rel="stylesheet" type="text/css" href="components&#x2f;counter&#x2f;index.css">"#,
                r#"<p data-tpl-key="0" data-tpl-text="counter.value">3</p>"#,
                r#"<script type="text/javascript" src="components&#x2f;counter&#x2f;index.js"></script>"#,
            )
        );

        renderer.engine().set("counter.value", json!(4)).unwrap();
        assert!(component.to_html().contains(">4</p>"));
    }

    #[tokio::test]
    async fn data_sections_merge_one_level_down() {
        let renderer = renderer(&[
            (
                "form/index.json",
                r#"{"defaults": {"form": {"email": "a@b.c"}}, "extra": {"theme": "dark"}, "version": 2}"#,
            ),
            ("form/index.html", r#"<input value="{{form.email}}">"#),
        ]);
        renderer.engine().set("form.agree", json!(true)).unwrap();
        let component = renderer.render("form").await.unwrap();

        assert!(component.data_merged);
        let engine = renderer.engine();
        assert_eq!(engine.get("form.email"), Some(json!("a@b.c")));
        assert_eq!(engine.get("form.agree"), Some(json!(true)));
        assert_eq!(engine.get("theme"), Some(json!("dark")));
        assert_eq!(engine.get("defaults"), None);
        assert_eq!(engine.get("version"), None);
        assert!(component.to_html().contains(r#"value="a@b.c""#));
    }

    #[tokio::test]
    async fn missing_data_skips_merge() {
        let renderer = renderer(&[("nav/index.html", "<nav>{{nav.title}}</nav>")]);
        let component = renderer.render("nav").await.unwrap();
        assert!(!component.data_merged);
        assert_eq!(renderer.engine().get("nav"), Some(json!({})));
    }

    #[tokio::test]
    async fn non_object_data_is_not_merged() {
        let renderer = renderer(&[
            ("list/index.json", "[1, 2]"),
            ("list/index.html", "<ul></ul>"),
        ]);
        let component = renderer.render("list").await.unwrap();
        assert!(!component.data_merged);
    }

    #[tokio::test]
    async fn missing_view_fails_render() {
        let renderer = renderer(&[("ghost/index.json", "{}")]);
        let err = renderer.render("ghost").await.unwrap_err();
        assert!(err.is_resource_error());
    }

    #[tokio::test]
    async fn unparsable_view_renders_empty() {
        let renderer = renderer(&[("bad/index.html", "<p title=\"x>")]);
        let component = renderer.render("bad").await.unwrap();
        assert_eq!(component.to_html(), "");
    }

    #[tokio::test]
    async fn page_grafts_components_and_tolerates_failures() {
        let renderer = renderer(&[
            ("title/index.json", r#"{"data": {"page": {"title": "Home"}}}"#),
            ("title/index.html", "<h1>{{page.title}}</h1>"),
        ]);
        let page = renderer
            .render_page(r#"<main><tpl id="title">loading</tpl><tpl id="missing"></tpl><tpl></tpl></main>"#)
            .await
            .unwrap();

        assert_eq!(page.components().count(), 1);
        assert_eq!(page.failed(), ["missing".to_string()]);
        let html = page.to_html();
        assert!(html.contains(r#"<tpl id="title"><link"#));
        assert!(html.contains("<h1 data-tpl-key=\"0\" data-tpl-text=\"page.title\">Home</h1>"));
        assert!(html.contains(r#"<tpl id="missing"></tpl>"#));
        assert!(!html.contains("loading"));
    }
}
