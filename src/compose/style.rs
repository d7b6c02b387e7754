//! Inline style to presentation attributes.

use crate::svg::Document;
use crate::svg::properties::is_presentation;

/// Editor declarations dropped outright.
const EDITOR_PREFIX: &str = "-inkscape-";

/// Hoist presentation properties out of every `style` attribute.
///
/// Hoisted values override an attribute of the same name. Declarations
/// without a presentation attribute stay in a reduced `style`.
pub fn strip_style_to_attrs(doc: &mut Document) {
    for id in doc.elements() {
        let Some(element) = doc.element_mut(id) else {
            continue;
        };
        let Some(style) = element.attrs.remove("style") else {
            continue;
        };

        let mut kept = Vec::new();
        for (property, value) in declarations(&style) {
            if property.starts_with(EDITOR_PREFIX) {
                continue;
            }
            if is_presentation(property) {
                element.attrs.set(property, value);
            } else {
                kept.push(format!("{property}:{value}"));
            }
        }
        if !kept.is_empty() {
            element.attrs.set("style", kept.join(";"));
        }
    }
}

/// `property: value` pairs of a declaration block, trimmed, empties skipped.
fn declarations(style: &str) -> impl Iterator<Item = (&str, &str)> {
    style.split(';').filter_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        let (property, value) = (property.trim(), value.trim());
        (!property.is_empty() && !value.is_empty()).then_some((property, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(doc: &Document) -> Vec<(String, String)> {
        let path = doc.query("path").unwrap()[0];
        doc.element(path)
            .unwrap()
            .attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_hoists_presentation_properties() {
        let mut doc = Document::parse(
            r#"<svg><path fill="red" style="fill:#000; stroke-width : 2 ;-inkscape-font-specification:Sans"/></svg>"#,
        )
        .unwrap();
        strip_style_to_attrs(&mut doc);
        assert_eq!(
            attrs(&doc),
            vec![
                ("fill".to_string(), "#000".to_string()),
                ("stroke-width".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_keeps_unknown_declarations() {
        let mut doc =
            Document::parse(r#"<svg><path style="fill:red;mix-blend-mode:multiply;transform-origin:center"/></svg>"#)
                .unwrap();
        strip_style_to_attrs(&mut doc);
        let path = doc.query("path").unwrap()[0];
        let element = doc.element(path).unwrap();
        assert_eq!(element.attrs.get("fill"), Some("red"));
        assert_eq!(element.attrs.get("mix-blend-mode"), Some("multiply"));
        assert_eq!(element.attrs.get("style"), Some("transform-origin:center"));
    }

    #[test]
    fn test_empty_style_is_removed() {
        let mut doc = Document::parse(r#"<svg><path style=" ; "/></svg>"#).unwrap();
        strip_style_to_attrs(&mut doc);
        assert!(attrs(&doc).is_empty());
    }
}
