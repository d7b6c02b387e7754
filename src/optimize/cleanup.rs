//! Comments, defaults and no-op attributes.

use super::{OptimizeOptions, context_free, has_stylesheet, inherited_value};
use crate::svg::document::local_name;
use crate::svg::numbers::{round_attribute, round_numbers};
use crate::svg::properties::{
    ELEMENT_DEFAULTS, PRESENTATION_DEFAULTS, inherited_default, is_default_value, is_inherited,
};
use crate::svg::{Document, Element, NodeKind};
use regex::Regex;
use std::sync::LazyLock;

static TRANSFORM_FN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z]+)[ \t\n\r]*\(([^)]*)\)").unwrap());

/// Elements that inherit unspecified attributes through `href`.
const TEMPLATED: &[&str] = &["linearGradient", "radialGradient", "pattern", "filter"];

/// Pass 1.
pub fn remove_comments(doc: &mut Document) {
    let comments: Vec<_> = doc
        .subtree(doc.root())
        .into_iter()
        .filter(|&id| matches!(doc.kind(id), Some(NodeKind::Comment(_))))
        .collect();
    for id in comments {
        doc.decompose(id);
    }
}

/// Pass 2: attributes restating an initial value.
///
/// Inherited properties are only dropped where no ancestor sets another
/// value, outside context-free subtrees, and only without a stylesheet that
/// could target the ancestors.
pub fn remove_default_attrs(doc: &mut Document, options: &OptimizeOptions) {
    let context_free = context_free(doc);
    let inherited_ok = !has_stylesheet(doc);

    for id in doc.elements() {
        let Some(element) = doc.element(id) else {
            continue;
        };
        let check_inherited = inherited_ok && !context_free.contains(&id);
        let doomed: Vec<String> = element
            .attrs
            .iter()
            .filter(|&(name, value)| {
                let value = round_attribute(name, value, options.precision);
                is_element_default(element, name, &value)
                    || PRESENTATION_DEFAULTS
                        .iter()
                        .any(|&(property, default)| property == name && is_default_value(&value, default))
                    || (check_inherited && is_inherited_default(doc, id, name, &value))
            })
            .map(|(name, _)| name.to_string())
            .collect();

        remove_all(doc, id, &doomed);
    }
}

fn is_element_default(element: &Element, name: &str, value: &str) -> bool {
    let local = element.local_name();
    if TEMPLATED.contains(&local) && element.attrs.iter().any(|(key, _)| local_name(key) == "href") {
        return false;
    }
    ELEMENT_DEFAULTS
        .iter()
        .find(|(tag, _)| *tag == local)
        .is_some_and(|(_, defaults)| {
            defaults
                .iter()
                .any(|&(attr, default)| attr == name && is_default_value(value, default))
        })
}

fn is_inherited_default(doc: &Document, id: crate::svg::NodeId, name: &str, value: &str) -> bool {
    let Some(defaults) = inherited_default(name) else {
        return false;
    };
    let is_initial = |v: &str| defaults.iter().any(|default| is_default_value(v, default));
    is_initial(value) && inherited_value(doc, id, name).is_none_or(is_initial)
}

/// Pass 3: identity transforms, empty attributes, restated inherited values.
pub fn remove_redundant_attrs(doc: &mut Document, options: &OptimizeOptions) {
    let context_free = context_free(doc);
    let inherited_ok = !has_stylesheet(doc);
    let precision = options.precision;

    for id in doc.elements() {
        let Some(element) = doc.element(id) else {
            continue;
        };
        let check_inherited = inherited_ok && !context_free.contains(&id);
        let doomed: Vec<String> = element
            .attrs
            .iter()
            .filter(|&(name, value)| match name {
                "transform" | "gradientTransform" | "patternTransform" => {
                    is_identity_transform(value, precision)
                }
                "class" | "style" | "id" => value.trim().is_empty(),
                _ if check_inherited && is_inherited(name) => inherited_value(doc, id, name)
                    .is_some_and(|parent| {
                        round_attribute(name, parent, precision)
                            == round_attribute(name, value, precision)
                    }),
                _ => false,
            })
            .map(|(name, _)| name.to_string())
            .collect();

        remove_all(doc, id, &doomed);
    }
}

/// Whether a transform list reduces to the identity at `precision`.
pub(super) fn is_identity_transform(value: &str, precision: usize) -> bool {
    let rounded = round_numbers(value, precision);
    let leftover = TRANSFORM_FN.replace_all(&rounded, "");
    if leftover.chars().any(|ch| !ch.is_whitespace() && ch != ',') {
        return false;
    }

    TRANSFORM_FN.captures_iter(&rounded).all(|caps| {
        let args: Option<Vec<f64>> = caps[2]
            .split(|ch: char| ch.is_whitespace() || ch == ',')
            .filter(|arg| !arg.is_empty())
            .map(|arg| arg.parse().ok())
            .collect();
        let Some(args) = args else {
            return false;
        };
        match &caps[1] {
            "translate" => args.iter().all(|&v| v == 0.0),
            "scale" => !args.is_empty() && args.iter().all(|&v| v == 1.0),
            "rotate" | "skewX" | "skewY" => args.first().is_some_and(|&v| v == 0.0),
            "matrix" => args == [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            _ => false,
        }
    })
}

fn remove_all(doc: &mut Document, id: crate::svg::NodeId, names: &[String]) {
    if names.is_empty() {
        return;
    }
    if let Some(element) = doc.element_mut(id) {
        for name in names {
            element.attrs.remove(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, pass: fn(&mut Document, &OptimizeOptions)) -> Document {
        let mut doc = Document::parse(text).unwrap();
        pass(&mut doc, &OptimizeOptions::default());
        doc
    }

    fn attrs_of(doc: &Document, id: &str) -> Vec<String> {
        let node = doc.find_id(id).unwrap();
        doc.element(node)
            .unwrap()
            .attrs
            .iter()
            .filter(|(k, _)| *k != "id")
            .map(|(k, v)| format!("{k}={v}"))
            .collect()
    }

    #[test]
    fn test_remove_comments() {
        let mut doc = Document::parse("<svg><!-- a --><g><!-- b --><path/></g></svg>").unwrap();
        remove_comments(&mut doc);
        assert_eq!(doc.descendants(doc.root()).len(), 2);
    }

    #[test]
    fn test_element_defaults() {
        let doc = run(
            r##"<svg><rect id="r" x="0" y="0.0001" width="2"/><linearGradient id="l" x1="0" x2="100%" gradientUnits="objectBoundingBox"/><linearGradient id="t" href="#l" x2="100%"/></svg>"##,
            remove_default_attrs,
        );
        assert_eq!(attrs_of(&doc, "r"), vec!["width=2"]);
        assert!(attrs_of(&doc, "l").is_empty());
        // templated elements keep values that would otherwise be inherited
        assert_eq!(attrs_of(&doc, "t"), vec!["href=#l", "x2=100%"]);
    }

    #[test]
    fn test_inherited_defaults_respect_ancestors() {
        let doc = run(
            r##"<svg><g fill="red"><path id="a" fill="#000"/></g><path id="b" fill="#000" fill-opacity="1" opacity="1"/></svg>"##,
            remove_default_attrs,
        );
        assert_eq!(attrs_of(&doc, "a"), vec!["fill=#000"]);
        assert!(attrs_of(&doc, "b").is_empty());
    }

    #[test]
    fn test_inherited_defaults_kept_in_definitions() {
        let doc = run(
            r##"<svg><defs><path id="p" fill-opacity="1"/></defs><use href="#p"/></svg>"##,
            remove_default_attrs,
        );
        assert_eq!(attrs_of(&doc, "p"), vec!["fill-opacity=1"]);
    }

    #[test]
    fn test_inherited_defaults_kept_with_stylesheet() {
        let doc = run(
            r##"<svg><style>.x{fill:red}</style><g class="x"><path id="p" fill="#000"/></g></svg>"##,
            remove_default_attrs,
        );
        assert_eq!(attrs_of(&doc, "p"), vec!["fill=#000"]);
    }

    #[test]
    fn test_identity_transforms() {
        let identities = [
            "",
            "translate(0)",
            "translate(0,0) scale(1)",
            "rotate(0 8 8)",
            "matrix(1 0 0 1 0 0)",
            "translate(.0001 0)",
            "translate( 0 , 0 )",
            "scale(1)\n rotate(0)",
            "translate\t(0,0)",
            "matrix(1,0,0,1,0,0)",
        ];
        for identity in identities {
            assert!(is_identity_transform(identity, 3), "{identity}");
        }
        let real = [
            "translate(1)",
            "scale(-1 1)",
            "rotate(90)",
            "matrix(1 0 0 1 2 0)",
            "translate(0) junk",
            "scale()",
            "translate( 2 , 0 )",
            "scale(1)\n rotate(45)",
        ];
        for real in real {
            assert!(!is_identity_transform(real, 3), "{real}");
        }
    }

    #[test]
    fn test_remove_redundant_attrs() {
        let doc = run(
            r#"<svg stroke-width="2"><g id="g" transform="translate(0 0)" class=" " stroke-width="2.0001"><path id="p" stroke-width="2" style="" transform="scale(2)"/></g></svg>"#,
            remove_redundant_attrs,
        );
        assert!(attrs_of(&doc, "g").is_empty());
        assert_eq!(attrs_of(&doc, "p"), vec!["transform=scale(2)"]);
    }
}
