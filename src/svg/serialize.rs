//! Minified, prefix-free SVG text.

use super::document::{Document, Element, NodeId, NodeKind, local_name, prefix};
use super::error::NamespaceCollisionError;
use quick_xml::escape::{escape, partial_escape};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Render `doc` with an XML declaration and no insignificant whitespace.
///
/// Element and attribute prefixes are stripped and `xmlns:*` declarations
/// dropped; the default `xmlns` stays. A prefixed root without one gets its
/// prefix's namespace as the default, so the output stays in that namespace.
pub fn serialize(doc: &Document) -> Result<String, NamespaceCollisionError> {
    let mut out = String::with_capacity(1024);
    out.push_str(DECLARATION);
    write_node(doc, doc.root(), &mut out)?;
    Ok(out)
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) -> Result<(), NamespaceCollisionError> {
    match doc.kind(id) {
        Some(NodeKind::Element(element)) => {
            let name = element.local_name();
            let mut attrs = stripped_attributes(element)?;
            if id == doc.root()
                && let Some(namespace) = restored_namespace(element)
            {
                attrs.insert(0, ("xmlns", namespace));
            }
            out.push('<');
            out.push_str(name);
            for (key, value) in attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape(value));
                out.push('"');
            }

            let children = doc.children(id);
            if children.is_empty() {
                out.push_str("/>");
                return Ok(());
            }
            out.push('>');
            for &child in children {
                write_node(doc, child, out)?;
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Some(NodeKind::Text(text)) => out.push_str(&partial_escape(text.as_str())),
        Some(NodeKind::CData(text)) => {
            out.push_str("<![CDATA[");
            out.push_str(text);
            out.push_str("]]>");
        }
        Some(NodeKind::Comment(text)) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        None => {}
    }
    Ok(())
}

/// Default namespace to declare on a root whose prefix is being stripped.
fn restored_namespace(root: &Element) -> Option<&str> {
    let bound = prefix(&root.name)?;
    if root.attrs.contains("xmlns") {
        return None;
    }
    Some(
        root.attrs
            .get(&format!("xmlns:{bound}"))
            .unwrap_or(SVG_NAMESPACE),
    )
}

/// Attributes with local names, colliding equal values collapsed.
fn stripped_attributes(element: &Element) -> Result<Vec<(&str, &str)>, NamespaceCollisionError> {
    let mut out: Vec<(&str, &str, &str)> = Vec::with_capacity(element.attrs.len());
    for (key, value) in element.attrs.iter() {
        if prefix(key) == Some("xmlns") {
            continue;
        }
        let name = local_name(key);
        match out.iter().find(|(seen, _, _)| *seen == name) {
            Some((_, _, seen_value)) if *seen_value == value => {}
            Some((_, first, _)) => {
                return Err(NamespaceCollisionError {
                    element: element.name.clone(),
                    name: name.to_string(),
                    first: first.to_string(),
                    second: key.to_string(),
                });
            }
            None => out.push((name, key, value)),
        }
    }
    Ok(out.into_iter().map(|(name, _, value)| (name, value)).collect())
}
