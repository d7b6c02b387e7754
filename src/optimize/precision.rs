//! Pass 9.

use super::OptimizeOptions;
use crate::svg::Document;
use crate::svg::numbers::round_attribute;
use std::borrow::Cow;

/// Round geometric attributes, path data, points and transforms.
pub fn optimise_attr_precision(doc: &mut Document, options: &OptimizeOptions) {
    for id in doc.elements() {
        let Some(element) = doc.element_mut(id) else {
            continue;
        };
        for (name, value) in element.attrs.values_mut() {
            let rounded = match round_attribute(name, value, options.precision) {
                Cow::Owned(rounded) => rounded,
                Cow::Borrowed(_) => continue,
            };
            *value = rounded;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimise_attr_precision() {
        let mut doc = Document::parse(
            r##"<svg viewBox="0 0 16.0000 16"><path d="M 0.12345,1.5 L 2.0 -0.0001 z" fill="#0000ff" opacity=".123456"/></svg>"##,
        )
        .unwrap();
        optimise_attr_precision(&mut doc, &OptimizeOptions {
            precision: 2,
            ..Default::default()
        });

        assert_eq!(doc.root_element().attrs.get("viewBox"), Some("0 0 16 16"));
        let path = doc.child_elements(doc.root()).next().unwrap();
        let attrs = &doc.element(path).unwrap().attrs;
        assert_eq!(attrs.get("d"), Some("M.12 1.5L2 0z"));
        assert_eq!(attrs.get("fill"), Some("#0000ff"));
        // not geometric
        assert_eq!(attrs.get("opacity"), Some(".123456"));
    }
}
