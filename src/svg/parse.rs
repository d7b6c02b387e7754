//! SVG text to [`Document`] using quick-xml.
//!
//! Whitespace-only text between elements is insignificant for icons and is
//! dropped here, which is what makes the serialized output minified. The
//! prolog (declaration, doctype, processing instructions) is not kept.

use super::document::{Attributes, Document, Element, NodeId, NodeKind};
use super::error::ParseError;
use quick_xml::{
    Reader,
    escape::{resolve_predefined_entity, unescape},
    events::{BytesStart, Event},
};

impl Document {
    /// Parse a well-formed SVG document.
    pub fn parse(text: &str) -> Result<Document, ParseError> {
        Builder::default().run(text)
    }
}

#[derive(Default)]
struct Builder {
    doc: Option<Document>,
    stack: Vec<NodeId>,
    pending: String,
}

impl Builder {
    fn run(mut self, text: &str) -> Result<Document, ParseError> {
        let mut reader = Reader::from_str(text);

        loop {
            let position = reader.buffer_position() as u64;
            let malformed = |message: String| ParseError::Malformed { position, message };

            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    self.flush_text()?;
                    let element = element_from(&start).map_err(malformed)?;
                    let id = self.open(element)?;
                    self.stack.push(id);
                }
                Ok(Event::Empty(start)) => {
                    self.flush_text()?;
                    let element = element_from(&start).map_err(malformed)?;
                    self.open(element)?;
                }
                Ok(Event::End(_)) => {
                    self.flush_text()?;
                    self.stack.pop();
                }
                Ok(Event::Text(text)) => {
                    let raw = text.decode().map_err(|e| malformed(e.to_string()))?;
                    let value = unescape(&raw).map_err(|e| malformed(e.to_string()))?;
                    self.pending.push_str(&value);
                }
                Ok(Event::GeneralRef(reference)) => {
                    let name = reference.decode().map_err(|e| malformed(e.to_string()))?;
                    push_reference(&mut self.pending, &name);
                }
                Ok(Event::CData(data)) => {
                    self.flush_text()?;
                    let value = data.decode().map_err(|e| malformed(e.to_string()))?;
                    self.leaf(NodeKind::CData(value.into_owned()));
                }
                Ok(Event::Comment(comment)) => {
                    self.flush_text()?;
                    let value = comment.decode().map_err(|e| malformed(e.to_string()))?;
                    self.leaf(NodeKind::Comment(value.into_owned()));
                }
                Ok(Event::Eof) => break,
                // declaration, doctype and processing instructions
                Ok(_) => {}
                Err(e) => {
                    return Err(ParseError::Malformed {
                        position: reader.error_position() as u64,
                        message: e.to_string(),
                    });
                }
            }
        }

        self.flush_text()?;
        if let Some(&open) = self.stack.last() {
            let name = self
                .doc
                .as_ref()
                .and_then(|doc| doc.element(open))
                .map(|element| element.name.clone())
                .unwrap_or_default();
            return Err(ParseError::Unclosed(name));
        }
        self.doc.ok_or(ParseError::NoRoot)
    }

    /// Attach a new element to the current parent, or make it the root.
    fn open(&mut self, element: Element) -> Result<NodeId, ParseError> {
        match (&mut self.doc, self.stack.last()) {
            (Some(doc), Some(&parent)) => {
                let id = doc.create_element(element);
                doc.append_child(parent, id);
                Ok(id)
            }
            (Some(_), None) => Err(ParseError::MultipleRoots(element.name)),
            (None, _) => {
                let doc = Document::new(element);
                let root = doc.root();
                self.doc = Some(doc);
                Ok(root)
            }
        }
    }

    /// Attach a non-element node; nodes outside the root are dropped.
    fn leaf(&mut self, kind: NodeKind) {
        if let (Some(doc), Some(&parent)) = (&mut self.doc, self.stack.last()) {
            let id = doc.create(kind);
            doc.append_child(parent, id);
        }
    }

    fn flush_text(&mut self) -> Result<(), ParseError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.pending);
        if text.trim().is_empty() {
            return Ok(());
        }
        if self.stack.is_empty() {
            return Err(ParseError::StrayText);
        }
        self.leaf(NodeKind::Text(text));
        Ok(())
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, String> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| e.to_string())?
        .to_string();
    let mut attrs = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(|e| e.to_string())?;
        let raw = std::str::from_utf8(&attr.value).map_err(|e| e.to_string())?;
        let value = unescape(raw).map_err(|e| e.to_string())?;
        attrs.set(key, value.into_owned());
    }
    Ok(Element { name, attrs })
}

/// Resolve `&name;` / `&#N;` / `&#xN;`; unknown entities are kept verbatim.
fn push_reference(out: &mut String, name: &str) {
    let numeric = name.strip_prefix('#').and_then(|code| {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        char::from_u32(value)
    });
    match (numeric, resolve_predefined_entity(name)) {
        (Some(ch), _) => out.push(ch),
        (None, Some(resolved)) => out.push_str(resolved),
        (None, None) => {
            out.push('&');
            out.push_str(name);
            out.push(';');
        }
    }
}
