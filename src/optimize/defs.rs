//! Definitions: pruning, merging and shape sharing.

use super::{OptimizeOptions, has_stylesheet, holds_reserved, in_non_rendered};
use crate::recipe::ReservedIds;
use crate::svg::{Document, Element, Likeness, NodeId, references};
use rustc_hash::{FxHashMap, FxHashSet};

/// Shapes considered by [`recycle_identical_paths`].
const SHAPES: &[&str] = &["path", "rect", "circle", "ellipse", "line", "polyline", "polygon"];

/// `<use href="#xx"/>`, the cost of one member after sharing.
const USE_COST: usize = 17;
/// ` id="xx"`, added to the shared definition.
const ID_COST: usize = 8;

/// Element children of every `defs`, in document order.
fn defs_children(doc: &Document) -> Vec<NodeId> {
    doc.elements()
        .into_iter()
        .filter(|&id| doc.element(id).is_some_and(|e| e.is("defs")))
        .flat_map(|defs| doc.child_elements(defs).collect::<Vec<_>>())
        .collect()
}

// ============================================================================
// Pass 6
// ============================================================================

/// Drop definitions nothing outside themselves points at, then empty `defs`.
pub fn remove_unused_definitions(doc: &mut Document, options: &OptimizeOptions) {
    loop {
        let refs = references::references(doc);
        let mut removed = false;

        for def in defs_children(doc) {
            if !doc.is_alive(def) {
                continue;
            }
            let kept = doc
                .element(def)
                .is_none_or(|e| e.is("style") || e.is("script"))
                || holds_reserved(doc, def, &options.reserved)
                || is_used(doc, def, &refs);
            if !kept {
                doc.decompose(def);
                removed = true;
            }
        }

        if !removed {
            break;
        }
    }

    let empty: Vec<_> = doc
        .elements()
        .into_iter()
        .filter(|&id| {
            doc.element(id).is_some_and(|e| e.is("defs")) && doc.child_elements(id).next().is_none()
        })
        .collect();
    for defs in empty {
        doc.decompose(defs);
    }
}

/// Whether a live holder outside `def` references an id inside it.
fn is_used(doc: &Document, def: NodeId, refs: &[(NodeId, String)]) -> bool {
    let ids: FxHashSet<&str> = doc
        .subtree(def)
        .into_iter()
        .filter_map(|node| doc.element(node).and_then(Element::id))
        .collect();
    !ids.is_empty()
        && refs.iter().any(|(holder, target)| {
            ids.contains(target.as_str())
                && doc.is_alive(*holder)
                && !doc.is_inclusive_ancestor(def, *holder)
        })
}

// ============================================================================
// Pass 7
// ============================================================================

/// Merge structurally identical definitions until none are left.
pub fn recycle_identical_defs(doc: &mut Document, options: &OptimizeOptions) {
    let likeness = Likeness::IGNORE_IDS.rounded(options.precision);
    while let Some((survivor, duplicate)) = find_duplicate(doc, likeness, &options.reserved) {
        merge_into(doc, survivor, duplicate);
    }
}

/// First definition, in document order, equal to an earlier one.
fn find_duplicate(
    doc: &Document,
    likeness: Likeness,
    reserved: &ReservedIds,
) -> Option<(NodeId, NodeId)> {
    let candidates: Vec<NodeId> = defs_children(doc)
        .into_iter()
        .filter(|&id| doc.element(id).is_some_and(|e| !e.is("script")))
        .collect();

    let mut buckets: FxHashMap<u64, Vec<NodeId>> = FxHashMap::default();
    for &candidate in &candidates {
        let bucket = buckets
            .entry(doc.structural_hash(candidate, likeness))
            .or_default();
        let survivor = bucket
            .iter()
            .copied()
            .find(|&earlier| doc.same_structure(earlier, candidate, likeness));
        match survivor {
            Some(survivor) if !holds_reserved(doc, candidate, reserved) => {
                return Some((survivor, candidate));
            }
            Some(_) => {}
            None => bucket.push(candidate),
        }
    }
    None
}

/// Remove `duplicate`, pointing every reference to its ids at `survivor`.
fn merge_into(doc: &mut Document, survivor: NodeId, duplicate: NodeId) {
    let mut redirects = FxHashMap::default();
    let mut moves = Vec::new();

    for (kept, dropped) in doc.subtree(survivor).into_iter().zip(doc.subtree(duplicate)) {
        let Some(dropped_id) = doc.element(dropped).and_then(Element::id) else {
            continue;
        };
        match doc.element(kept).and_then(Element::id) {
            Some(kept_id) if kept_id != dropped_id => {
                redirects.insert(dropped_id.to_string(), kept_id.to_string());
            }
            Some(_) => {}
            None => moves.push((kept, dropped_id.to_string())),
        }
    }

    doc.decompose(duplicate);
    for (node, id) in moves {
        if let Some(element) = doc.element_mut(node) {
            element.attrs.set("id", id);
        }
    }
    let nodes = doc.subtree(doc.root());
    references::redirect(doc, &nodes, &redirects);
}

// ============================================================================
// Pass 8
// ============================================================================

/// Share repeated body shapes through `defs` and `<use>`.
pub fn recycle_identical_paths(doc: &mut Document, options: &OptimizeOptions) {
    let likeness = Likeness {
        ignore_ids: false,
        ignore_root_attrs: &["id", "transform"],
        precision: Some(options.precision),
    };
    let stylesheet = has_stylesheet(doc);
    let referenced = references::referenced_ids(doc);

    let mut groups: Vec<Vec<NodeId>> = Vec::new();
    let mut by_hash: FxHashMap<u64, Vec<usize>> = FxHashMap::default();
    for id in doc.elements() {
        if !is_shareable(doc, id, stylesheet, &referenced, &options.reserved) {
            continue;
        }
        let slot = by_hash.entry(doc.structural_hash(id, likeness)).or_default();
        match slot
            .iter()
            .copied()
            .find(|&group| doc.same_structure(groups[group][0], id, likeness))
        {
            Some(group) => groups[group].push(id),
            None => {
                slot.push(groups.len());
                groups.push(vec![id]);
            }
        }
    }

    let mut counter = 0;
    for group in groups {
        if group.len() < 2 || !saves_bytes(doc, group[0], group.len()) {
            continue;
        }
        let Some(shared) = shared_definition(doc, group[0], likeness, options, &mut counter)
        else {
            continue;
        };
        for member in group {
            replace_with_use(doc, member, &shared);
        }
    }
}

fn is_shareable(
    doc: &Document,
    id: NodeId,
    stylesheet: bool,
    referenced: &FxHashSet<String>,
    reserved: &ReservedIds,
) -> bool {
    let Some(element) = doc.element(id) else {
        return false;
    };
    SHAPES.contains(&element.local_name())
        && doc.children(id).is_empty()
        && !(stylesheet && element.attrs.contains("class"))
        && element
            .id()
            .is_none_or(|value| !reserved.contains(value) && !referenced.contains(value))
        && !in_non_rendered(doc, id)
}

/// Whether `count` copies of `sample` outweigh one definition plus uses.
fn saves_bytes(doc: &Document, sample: NodeId, count: usize) -> bool {
    let Some(element) = doc.element(sample) else {
        return false;
    };
    let len = element.name.len()
        + 3
        + element
            .attrs
            .iter()
            .filter(|&(name, _)| name != "id" && name != "transform")
            .map(|(name, value)| name.len() + value.len() + 4)
            .sum::<usize>();
    count * len > len + ID_COST + count * USE_COST
}

/// Id of a transform-free definition equal to `sample`, hoisting one if needed.
fn shared_definition(
    doc: &mut Document,
    sample: NodeId,
    likeness: Likeness,
    options: &OptimizeOptions,
    counter: &mut usize,
) -> Option<String> {
    let existing = defs_children(doc).into_iter().find(|&def| {
        doc.element(def)
            .is_some_and(|e| !e.attrs.contains("transform"))
            && doc.same_structure(def, sample, likeness)
    });

    let def = match existing {
        Some(def) => def,
        None => {
            let copy = doc.deep_clone(sample)?;
            if let Some(element) = doc.element_mut(copy) {
                element.attrs.remove("id");
                element.attrs.remove("transform");
            }
            let defs = doc.ensure_defs();
            doc.append_child(defs, copy);
            copy
        }
    };

    if let Some(id) = doc.element(def).and_then(Element::id) {
        return Some(id.to_string());
    }
    let id = fresh_id(doc, &options.reserved, counter);
    doc.element_mut(def)?.attrs.set("id", id.clone());
    Some(id)
}

/// An id no element carries, nothing references and nobody reserved.
fn fresh_id(doc: &Document, reserved: &ReservedIds, counter: &mut usize) -> String {
    let taken = references::id_index(doc);
    let referenced = references::referenced_ids(doc);
    loop {
        let id = format!("shape-{counter}");
        *counter += 1;
        if !taken.contains_key(&id) && !referenced.contains(&id) && !reserved.contains(&id) {
            return id;
        }
    }
}

fn replace_with_use(doc: &mut Document, member: NodeId, shared: &str) {
    let Some(element) = doc.element(member) else {
        return;
    };
    let mut usage = Element::new("use");
    if let Some(id) = element.id() {
        usage.attrs.set("id", id);
    }
    usage.attrs.set("href", format!("#{shared}"));
    if let Some(transform) = element.attrs.get("transform") {
        usage.attrs.set("transform", transform);
    }

    let node = doc.create_element(usage);
    doc.replace_with(member, &[node]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg::serialize;

    fn body(doc: &Document) -> String {
        let out = serialize(doc).unwrap();
        out.split_once("?>").unwrap().1.to_string()
    }

    #[test]
    fn test_remove_unused_definitions() {
        let mut doc = Document::parse(
            r##"<svg><defs>
                <linearGradient id="base"/>
                <linearGradient id="chained" href="#base"/>
                <linearGradient id="used"/>
                <clipPath id="self"><use href="#self"/></clipPath>
                <g><path id="inner"/></g>
                <style>.a{}</style>
                <path id="keep"/>
            </defs><rect fill="url(#used)"/><use href="#inner"/></svg>"##,
        )
        .unwrap();
        let options = OptimizeOptions {
            reserved: ReservedIds::from_iter(["keep"]),
            ..Default::default()
        };
        remove_unused_definitions(&mut doc, &options);

        assert_eq!(
            body(&doc),
            r##"<svg><defs><linearGradient id="used"/><g><path id="inner"/></g><style>.a{}</style><path id="keep"/></defs><rect fill="url(#used)"/><use href="#inner"/></svg>"##
        );
    }

    #[test]
    fn test_empty_defs_removed() {
        let mut doc =
            Document::parse(r#"<svg><defs><linearGradient id="x"/></defs><defs/><path/></svg>"#)
                .unwrap();
        remove_unused_definitions(&mut doc, &OptimizeOptions::default());
        assert_eq!(body(&doc), "<svg><path/></svg>");
    }

    #[test]
    fn test_recycle_identical_defs() {
        let mut doc = Document::parse(
            r##"<svg><defs>
                <linearGradient id="a"><stop offset="1"/></linearGradient>
                <linearGradient id="b"><stop id="s" offset="1.0001"/></linearGradient>
                <linearGradient id="c"><stop offset="1"/></linearGradient>
            </defs>
            <rect fill="url(#b)"/><rect fill="url(#c)"/><use href="#s"/></svg>"##,
        )
        .unwrap();
        recycle_identical_defs(&mut doc, &OptimizeOptions::default());

        // the stop id moved onto the survivor's id-less stop
        assert_eq!(
            body(&doc),
            r##"<svg><defs><linearGradient id="a"><stop offset="1" id="s"/></linearGradient></defs><rect fill="url(#a)"/><rect fill="url(#a)"/><use href="#s"/></svg>"##
        );
    }

    #[test]
    fn test_reserved_duplicate_is_kept() {
        let mut doc = Document::parse(
            r#"<svg><defs><filter id="a"/><filter id="current-color-scheme"/></defs></svg>"#,
        )
        .unwrap();
        let options = OptimizeOptions {
            reserved: ReservedIds::from_iter(["current-color-scheme"]),
            ..Default::default()
        };
        recycle_identical_defs(&mut doc, &options);
        assert_eq!(doc.descendants(doc.root()).len(), 3);
    }

    const ARROW: &str = "M2 8l6-6 6 6h-4v6H6V8z";

    #[test]
    fn test_recycle_identical_paths() {
        let mut doc = Document::parse(&format!(
            r#"<svg><path id="left" d="{ARROW}" fill="red"/><g><path d="{ARROW}" fill="red" transform="rotate(90)"/></g><path d="{ARROW}" fill="blue"/></svg>"#
        ))
        .unwrap();
        recycle_identical_paths(&mut doc, &OptimizeOptions::default());

        assert_eq!(
            body(&doc),
            format!(
                r##"<svg><defs><path d="{ARROW}" fill="red" id="shape-0"/></defs><use id="left" href="#shape-0"/><g><use href="#shape-0" transform="rotate(90)"/></g><path d="{ARROW}" fill="blue"/></svg>"##
            )
        );
    }

    #[test]
    fn test_recycle_reuses_existing_definition() {
        let mut doc = Document::parse(&format!(
            r##"<svg><defs><path id="master" d="{ARROW}"/></defs><use href="#master"/><path d="{ARROW}"/><path d="{ARROW}"/><path d="{ARROW}"/></svg>"##
        ))
        .unwrap();
        recycle_identical_paths(&mut doc, &OptimizeOptions::default());
        assert_eq!(
            body(&doc),
            format!(
                r##"<svg><defs><path id="master" d="{ARROW}"/></defs><use href="#master"/><use href="#master"/><use href="#master"/><use href="#master"/></svg>"##
            )
        );
    }

    #[test]
    fn test_recycle_skips_small_reserved_and_referenced_shapes() {
        let text = r##"<svg><path d="M0 0"/><path d="M0 0"/><path id="current-color-scheme" d="M2 8l6-6 6 6h-4v6H6V8z"/><path d="M2 8l6-6 6 6h-4v6H6V8z"/><path id="t" d="M2 8l6-6 6 6h-4v6H6V8z"/><textPath href="#t"/></svg>"##;
        let mut doc = Document::parse(text).unwrap();
        let options = OptimizeOptions {
            reserved: ReservedIds::from_iter(["current-color-scheme"]),
            ..Default::default()
        };
        recycle_identical_paths(&mut doc, &options);
        assert!(!body(&doc).contains("<use"));
    }
}
