//! Markup parser - template text → `Document`
//!
//! Single forward pass over the input, in the spirit of a tokenizer feeding a
//! stack of open elements. Tolerant where browsers are (elements left open at
//! the end are closed implicitly, stray `<` is text), strict where the input
//! cannot be interpreted:
//! - unterminated comment, tag or quoted attribute value
//! - closing tag with no matching open element

use tracing::debug;

use super::document::{Document, Element, NodeId};
use super::{is_raw_text, is_void};
use crate::error::{BinderyError, Result};

/// Markup → DOM seam
///
/// The engine only needs a parsed fragment; hosts with a real DOM can plug
/// their own parser in.
pub trait FragmentParser: Send + Sync {
    fn parse_fragment(&self, markup: &str) -> Result<Document>;
}

/// Built-in HTML fragment parser
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupParser;

impl MarkupParser {
    pub fn new() -> Self {
        Self
    }
}

impl FragmentParser for MarkupParser {
    fn parse_fragment(&self, markup: &str) -> Result<Document> {
        Parser::new(markup).run()
    }
}

fn failure(position: usize, details: impl Into<String>) -> BinderyError {
    BinderyError::ParseFailure {
        position,
        details: details.into(),
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    doc: Document,
    open: Vec<NodeId>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let doc = Document::new();
        let root = doc.root();
        Self {
            src,
            pos: 0,
            doc,
            open: vec![root],
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn current(&self) -> NodeId {
        // The fragment root is never popped
        self.open.last().copied().unwrap_or_else(|| self.doc.root())
    }

    fn run(mut self) -> Result<Document> {
        while self.pos < self.src.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.comment()?;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.declaration()?;
            } else if rest.starts_with("</") {
                self.end_tag()?;
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                self.start_tag()?;
            } else {
                self.text();
            }
        }

        if self.open.len() > 1 {
            debug!(
                unclosed = self.open.len() - 1,
                "Closing elements left open at end of template"
            );
        }
        Ok(self.doc)
    }

    fn comment(&mut self) -> Result<()> {
        let body_start = self.pos + 4;
        let end = self.src[body_start..]
            .find("-->")
            .ok_or_else(|| failure(self.pos, "unterminated comment"))?;
        let text = &self.src[body_start..body_start + end];
        let node = self.doc.create_comment(text);
        let parent = self.current();
        self.doc.append_child(parent, node);
        self.pos = body_start + end + 3;
        Ok(())
    }

    /// `<!DOCTYPE ...>` and `<?...>` carry nothing the binder needs
    fn declaration(&mut self) -> Result<()> {
        let end = self
            .rest()
            .find('>')
            .ok_or_else(|| failure(self.pos, "unterminated declaration"))?;
        self.pos += end + 1;
        Ok(())
    }

    fn end_tag(&mut self) -> Result<()> {
        let end = self
            .rest()
            .find('>')
            .ok_or_else(|| failure(self.pos, "unterminated closing tag"))?;
        let name = self.rest()[2..end].trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(failure(self.pos, "closing tag without a name"));
        }

        let matching = self
            .open
            .iter()
            .rposition(|id| self.doc.element(*id).is_some_and(|e| e.tag() == name));
        match matching {
            Some(index) => self.open.truncate(index),
            None => {
                return Err(failure(
                    self.pos,
                    format!("closing tag </{name}> has no matching open element"),
                ))
            }
        }
        self.pos += end + 1;
        Ok(())
    }

    fn start_tag(&mut self) -> Result<()> {
        let tag_start = self.pos;
        let bytes = self.src.as_bytes();
        let mut i = self.pos + 1;

        while i < bytes.len() && is_name_byte(bytes[i]) {
            i += 1;
        }
        let mut element = Element::new(&self.src[self.pos + 1..i]);
        let mut self_closing = false;

        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i) {
                None => return Err(failure(tag_start, "unterminated tag")),
                Some(b'>') => {
                    i += 1;
                    break;
                }
                Some(b'/') if bytes.get(i + 1) == Some(&b'>') => {
                    self_closing = true;
                    i += 2;
                    break;
                }
                Some(b'/') => {
                    i += 1;
                    continue;
                }
                Some(_) => {}
            }

            let name_start = i;
            while i < bytes.len() && is_attribute_name_byte(bytes[i]) {
                i += 1;
            }
            if i == name_start {
                // Lone '=' or quote where a name should be
                i += 1;
                continue;
            }
            let name = self.src[name_start..i].to_ascii_lowercase();

            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if bytes.get(i) != Some(&b'=') {
                // Boolean attribute: <input checked>
                element.set_attribute(&name, "");
                continue;
            }
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }

            let value = match bytes.get(i) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let value_start = i + 1;
                    let close = self.src[value_start..]
                        .find(quote as char)
                        .ok_or_else(|| {
                            failure(name_start, format!("unterminated value for '{name}'"))
                        })?;
                    i = value_start + close + 1;
                    &self.src[value_start..value_start + close]
                }
                _ => {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>'
                    {
                        i += 1;
                    }
                    &self.src[value_start..i]
                }
            };
            element.set_attribute(&name, &decode_entities(value));
        }

        self.pos = i;
        let tag = element.tag().to_string();
        let node = self.doc.create_element(element);
        let parent = self.current();
        self.doc.append_child(parent, node);

        if self_closing || is_void(&tag) {
            return Ok(());
        }
        if is_raw_text(&tag) {
            return self.raw_text(node, &tag);
        }
        self.open.push(node);
        Ok(())
    }

    /// Content of `<script>`/`<style>` up to the matching close tag
    fn raw_text(&mut self, node: NodeId, tag: &str) -> Result<()> {
        let rest = self.rest();
        let closing = format!("</{tag}");
        let Some(end) = rest.to_ascii_lowercase().find(&closing) else {
            return Err(failure(self.pos, format!("unterminated <{tag}> element")));
        };
        let close_end = rest[end..]
            .find('>')
            .ok_or_else(|| failure(self.pos + end, "unterminated closing tag"))?;

        if end > 0 {
            let text = self.doc.create_text(&rest[..end]);
            self.doc.append_child(node, text);
        }
        self.pos += end + close_end + 1;
        Ok(())
    }

    fn text(&mut self) {
        let rest = self.rest();
        // Skip the first byte: a '<' here did not start a tag
        let len = rest
            .char_indices()
            .skip(1)
            .find(|(i, c)| *c == '<' && starts_markup(&rest[i + 1..]))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        let text = decode_entities(&rest[..len]);
        if !text.is_empty() {
            let node = self.doc.create_text(&text);
            let parent = self.current();
            self.doc.append_child(parent, node);
        }
        self.pos += len;
    }
}

fn starts_markup(after_lt: &str) -> bool {
    after_lt.starts_with(|c: char| c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?')
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn is_attribute_name_byte(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/' | b'"' | b'\'')
}

/// Decode the character references templates actually use
fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
