//! Id cross references.
//!
//! A reference is either an attribute whose local name is `href` and whose
//! value starts with `#` (`href`, `xlink:href`), or a `url(#id)` notation in
//! any attribute value or `<style>` sheet. Colors such as `fill="#fff"` are
//! not references.
//!
//! Renames go through [`rename`], which rewrites `id` attributes and every
//! reference to them in a single walk, so a tree is never observed with a
//! half-applied rename.

use super::document::{Document, NodeId, NodeKind, local_name};
use regex::{Captures, Regex};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::LazyLock;

static URL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\([ \t\n\r]*(['"]?)#([^)'" \t\n\r]+)['"]?[ \t\n\r]*\)"#).unwrap());

/// Ids referenced by one attribute value.
pub fn attribute_targets<'a>(name: &str, value: &'a str) -> Vec<&'a str> {
    if local_name(name) == "href"
        && let Some(id) = value.trim().strip_prefix('#')
    {
        return vec![id];
    }
    sheet_targets(value)
}

/// Ids referenced through `url(#id)` in free text.
fn sheet_targets(text: &str) -> Vec<&str> {
    if !text.contains("url(") {
        return Vec::new();
    }
    URL_REF
        .captures_iter(text)
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str())
        .collect()
}

/// Whether `id` is a text or CDATA node inside `<style>`.
fn is_sheet(doc: &Document, id: NodeId) -> bool {
    doc.parent(id)
        .and_then(|parent| doc.element(parent))
        .is_some_and(|element| element.is("style"))
}

/// Every reference in the subtree of `scope` as `(holder, target)`, in
/// document order. The holder of a stylesheet reference is its text node.
pub fn references_in(doc: &Document, scope: NodeId) -> Vec<(NodeId, String)> {
    let mut out = Vec::new();
    for node in doc.subtree(scope) {
        match doc.kind(node) {
            Some(NodeKind::Element(element)) => {
                for (name, value) in element.attrs.iter() {
                    out.extend(
                        attribute_targets(name, value)
                            .into_iter()
                            .map(|target| (node, target.to_string())),
                    );
                }
            }
            Some(NodeKind::Text(text) | NodeKind::CData(text)) if is_sheet(doc, node) => {
                out.extend(
                    sheet_targets(text)
                        .into_iter()
                        .map(|target| (node, target.to_string())),
                );
            }
            _ => {}
        }
    }
    out
}

/// Every reference in the document.
pub fn references(doc: &Document) -> Vec<(NodeId, String)> {
    references_in(doc, doc.root())
}

/// Set of referenced id strings.
pub fn referenced_ids(doc: &Document) -> FxHashSet<String> {
    references(doc)
        .into_iter()
        .map(|(_, target)| target)
        .collect()
}

/// Id string to the first element carrying it.
pub fn id_index(doc: &Document) -> FxHashMap<String, NodeId> {
    let mut index = FxHashMap::default();
    for node in doc.elements() {
        if let Some(id) = doc.element(node).and_then(|element| element.id()) {
            index.entry(id.to_string()).or_insert(node);
        }
    }
    index
}

/// Referenced ids that no element carries, deduplicated, in document order.
pub fn dangling_references(doc: &Document) -> Vec<String> {
    let index = id_index(doc);
    let mut seen = FxHashSet::default();
    references(doc)
        .into_iter()
        .map(|(_, target)| target)
        .filter(|target| !index.contains_key(target) && seen.insert(target.clone()))
        .collect()
}

/// Rename ids and the references to them, within `nodes`.
pub fn rename(doc: &mut Document, nodes: &[NodeId], renames: &FxHashMap<String, String>) {
    rewrite(doc, nodes, renames, true);
}

/// Point references at new targets without touching `id` attributes.
pub fn redirect(doc: &mut Document, nodes: &[NodeId], redirects: &FxHashMap<String, String>) {
    rewrite(doc, nodes, redirects, false);
}

fn rewrite(doc: &mut Document, nodes: &[NodeId], map: &FxHashMap<String, String>, ids: bool) {
    if map.is_empty() {
        return;
    }
    for &node in nodes {
        let sheet = is_sheet(doc, node);
        match doc.kind_mut(node) {
            Some(NodeKind::Element(element)) => {
                for (name, value) in element.attrs.values_mut() {
                    if let Some(updated) = rewrite_attribute(name, value, map, ids) {
                        *value = updated;
                    }
                }
            }
            Some(NodeKind::Text(text) | NodeKind::CData(text)) if sheet => {
                if let Some(updated) = rewrite_urls(text, map) {
                    *text = updated;
                }
            }
            _ => {}
        }
    }
}

fn rewrite_attribute(
    name: &str,
    value: &str,
    map: &FxHashMap<String, String>,
    ids: bool,
) -> Option<String> {
    if name == "id" {
        return if ids { map.get(value).cloned() } else { None };
    }
    if local_name(name) == "href"
        && let Some(id) = value.trim().strip_prefix('#')
    {
        return map.get(id).map(|target| format!("#{target}"));
    }
    rewrite_urls(value, map)
}

/// `None` when nothing changed.
fn rewrite_urls(text: &str, map: &FxHashMap<String, String>) -> Option<String> {
    if !text.contains("url(") {
        return None;
    }
    let mut changed = false;
    let out = URL_REF.replace_all(text, |caps: &Captures<'_>| match map.get(&caps[2]) {
        Some(target) => {
            changed = true;
            format!("url({quote}#{target}{quote})", quote = &caps[1])
        }
        None => caps[0].to_string(),
    });
    changed.then(|| out.into_owned())
}
