//! Markup serialization

use std::fmt::Write;

use v_htmlescape::escape;

use super::document::{Document, NodeData, NodeId};
use super::{is_raw_text, is_void};

pub(crate) fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    let Some(data) = doc.data(node) else {
        return;
    };

    match data {
        NodeData::Fragment => {
            for child in doc.children(node) {
                write_node(doc, *child, out);
            }
        }
        NodeData::Text(text) => {
            let raw = doc
                .parent(node)
                .and_then(|p| doc.element(p))
                .is_some_and(|e| is_raw_text(e.tag()));
            if raw {
                out.push_str(text);
            } else {
                let _ = write!(out, "{}", escape(text));
            }
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element(element) => {
            out.push('<');
            out.push_str(element.tag());
            for (name, value) in element.attributes() {
                out.push(' ');
                let _ = write!(out, "{}=\"{}\"", name, escape(value));
            }
            out.push('>');

            if is_void(element.tag()) {
                return;
            }
            for child in doc.children(node) {
                write_node(doc, *child, out);
            }
            out.push_str("</");
            out.push_str(element.tag());
            out.push('>');
        }
    }
}
