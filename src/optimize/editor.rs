//! Traces left by drawing tools.

use super::OptimizeOptions;
use crate::svg::document::prefix;
use crate::svg::{Document, references};
use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::LazyLock;

/// Ids of the shape `<tag-or-editor-word><digits>[-digits...]`.
static EDITOR_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:a|base|circle|clipPath|defs|desc|ellipse|fe[A-Za-z]+|filter|flowPara|flowRegion|flowRoot|g|grid|group|guide|image|layer|Layer_|line|linearGradient|marker|mask|metadata|namedview|path|path-effect|pattern|perspective|polygon|polyline|radialGradient|rect|stop|style|svg|switch|symbol|text|textPath|title|tspan|use)[0-9]+(?:-[0-9]+)*$",
    )
    .unwrap()
});

const EDITOR_PREFIXES: &[&str] = &["inkscape", "sodipodi", "sketch", "serif"];

const EDITOR_NAMESPACES: &[&str] = &[
    "http://www.inkscape.org/namespaces/inkscape",
    "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd",
    "http://inkscape.sourceforge.net/DTD/sodipodi-0.dtd",
    "http://www.bohemiancoding.com/sketch/ns",
    "http://www.serif.com/",
];

/// Every Adobe Illustrator namespace lives below this URI.
const ADOBE_NAMESPACE: &str = "http://ns.adobe.com/";

#[inline]
pub(super) fn is_editor_id(id: &str) -> bool {
    EDITOR_ID.is_match(id)
}

/// Pass 4: drop generated ids nothing points at.
pub fn remove_editor_only_ids(doc: &mut Document, options: &OptimizeOptions) {
    let referenced = references::referenced_ids(doc);
    for id in doc.elements() {
        let Some(element) = doc.element_mut(id) else {
            continue;
        };
        let removable = element.id().is_some_and(|value| {
            is_editor_id(value) && !options.reserved.contains(value) && !referenced.contains(value)
        });
        if removable {
            element.attrs.remove("id");
        }
    }
}

/// Pass 5: editor namespaces, `metadata`, unused `xmlns:*` declarations.
pub fn remove_editor_attrs(doc: &mut Document) {
    let editor = editor_prefixes(doc);

    let doomed: Vec<_> = doc
        .elements()
        .into_iter()
        .filter(|&id| {
            doc.element(id).is_some_and(|e| {
                e.is("metadata") || prefix(&e.name).is_some_and(|p| editor.contains(p))
            })
        })
        .collect();
    for id in doomed {
        doc.decompose(id);
    }

    for id in doc.elements() {
        if let Some(element) = doc.element_mut(id) {
            element
                .attrs
                .retain(|name, _| !is_editor_attribute(name, &editor));
        }
    }

    let used = used_prefixes(doc);
    for id in doc.elements() {
        if let Some(element) = doc.element_mut(id) {
            element.attrs.retain(|name, _| {
                name.strip_prefix("xmlns:")
                    .is_none_or(|declared| used.contains(declared))
            });
        }
    }
}

/// Well-known editor prefixes plus any prefix bound to an editor namespace.
fn editor_prefixes(doc: &Document) -> FxHashSet<String> {
    let mut out: FxHashSet<String> = EDITOR_PREFIXES.iter().map(|p| p.to_string()).collect();
    for id in doc.elements() {
        let Some(element) = doc.element(id) else {
            continue;
        };
        for (name, value) in element.attrs.iter() {
            if let Some(declared) = name.strip_prefix("xmlns:")
                && (EDITOR_NAMESPACES.contains(&value) || value.starts_with(ADOBE_NAMESPACE))
            {
                out.insert(declared.to_string());
            }
        }
    }
    out
}

fn is_editor_attribute(name: &str, editor: &FxHashSet<String>) -> bool {
    match name.strip_prefix("xmlns:") {
        Some(declared) => editor.contains(declared),
        None => prefix(name).is_some_and(|p| editor.contains(p)),
    }
}

/// Prefixes still used by element or attribute names.
fn used_prefixes(doc: &Document) -> FxHashSet<String> {
    let mut out = FxHashSet::default();
    for id in doc.elements() {
        let Some(element) = doc.element(id) else {
            continue;
        };
        out.extend(prefix(&element.name).map(str::to_string));
        for (name, _) in element.attrs.iter() {
            if !name.starts_with("xmlns:") {
                out.extend(prefix(name).map(str::to_string));
            }
        }
    }
    out
}
