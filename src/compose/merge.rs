//! Splicing one document's content into another.
//!
//! Drawable content replaces target nodes; definitions are union-appended
//! into the base's first `defs`. Ids of imported nodes that collide with ids
//! staying in the base are renamed to `<id>-<n>`, together with every
//! reference inside the imported copies. When several targets are replaced,
//! each copy after the first is renamed the same way.

use super::StructureError;
use crate::build::BuildError;
use crate::svg::document::same_structure;
use crate::svg::{Document, Element, Likeness, NodeId, Selector, references};
use rustc_hash::{FxHashMap, FxHashSet};

/// Top-level elements that are neither drawn nor definitions.
const NON_RENDERED: &[&str] = &["metadata", "title", "desc", "namedview"];

/// Replace the single node matched by `insertion` with the template's content.
pub fn merge_at(doc: &mut Document, insertion: &str, template: &Document) -> Result<(), BuildError> {
    let selector = Selector::parse(insertion)?;
    let found = doc.select(&selector);
    let &[target] = found.as_slice() else {
        return Err(StructureError::InsertionPoint {
            selector: insertion.to_string(),
            found: found.len(),
        }
        .into());
    };

    let root = template.root_element();
    if !root.is("svg") {
        return Err(StructureError::TemplateRoot(root.name.clone()).into());
    }
    let fragment = Fragment::of(template, template.root());
    if fragment.drawables.is_empty() {
        return Err(StructureError::EmptyTemplate.into());
    }

    splice(doc, template, &fragment, &[target], None);
    Ok(())
}

/// Importable parts of a source document.
#[derive(Debug, Default)]
pub(super) struct Fragment {
    /// Children of `defs`, plus top-level `style`.
    pub defs: Vec<NodeId>,
    pub drawables: Vec<NodeId>,
}

impl Fragment {
    /// Classify the element children of `container`.
    pub fn of(doc: &Document, container: NodeId) -> Self {
        let mut fragment = Self::default();
        for child in doc.child_elements(container) {
            let Some(element) = doc.element(child) else {
                continue;
            };
            if element.is("defs") {
                fragment.defs.extend(doc.child_elements(child));
            } else if element.is("style") {
                fragment.defs.push(child);
            } else if !NON_RENDERED.contains(&element.local_name()) {
                fragment.drawables.push(child);
            }
        }
        fragment
    }

    /// A whole non-`svg` document used as a single drawable.
    pub fn single(node: NodeId) -> Self {
        Self {
            defs: Vec::new(),
            drawables: vec![node],
        }
    }
}

/// Copy `fragment` from `source` over every node of `targets`, optionally
/// wrapping each copy in `wrapper`.
pub(super) fn splice(
    doc: &mut Document,
    source: &Document,
    fragment: &Fragment,
    targets: &[NodeId],
    wrapper: Option<&Element>,
) {
    let taken = surviving_ids(doc, targets);

    // definitions already present verbatim are not imported again
    let existing: Vec<NodeId> = doc
        .elements()
        .into_iter()
        .filter(|&id| doc.element(id).is_some_and(|e| e.is("defs")))
        .flat_map(|defs| doc.child_elements(defs).collect::<Vec<_>>())
        .collect();
    let imported_defs: Vec<NodeId> = fragment
        .defs
        .iter()
        .copied()
        .filter(|&def| {
            !existing
                .iter()
                .any(|&have| same_structure(doc, have, source, def, Likeness::EXACT, true))
        })
        .collect();

    let mut used: FxHashSet<String> = taken.clone();
    used.extend(references::id_index(source).into_keys());
    let renames = collision_renames(
        source,
        imported_defs.iter().chain(&fragment.drawables).copied(),
        &taken,
        &mut used,
    );

    if !imported_defs.is_empty() {
        let defs = doc.ensure_defs();
        for &def in &imported_defs {
            if let Some(copy) = import_renamed(doc, source, def, &renames) {
                doc.append_child(defs, copy);
            }
        }
    }

    let drawable_ids = ids_in(source, &fragment.drawables);
    let mut placed = 0;
    for &target in targets {
        if !doc.is_alive(target) {
            continue;
        }
        // every copy after the first gets ids of its own
        let copy_renames = if placed == 0 {
            renames.clone()
        } else {
            repeat_renames(&renames, &drawable_ids, &mut used)
        };
        let copies: Vec<NodeId> = fragment
            .drawables
            .iter()
            .filter_map(|&node| import_renamed(doc, source, node, &copy_renames))
            .collect();
        let content = match wrapper {
            Some(element) => vec![doc.wrap(element.clone(), &copies)],
            None => copies,
        };
        if doc.replace_with(target, &content) {
            placed += 1;
        } else {
            for node in content {
                doc.decompose(node);
            }
        }
    }
}

/// Ids of the base that remain once `targets` are replaced.
fn surviving_ids(doc: &Document, targets: &[NodeId]) -> FxHashSet<String> {
    doc.elements()
        .into_iter()
        .filter(|&id| !targets.iter().any(|&t| doc.is_inclusive_ancestor(t, id)))
        .filter_map(|id| doc.element(id).and_then(Element::id).map(str::to_string))
        .collect()
}

/// Fresh names for imported ids that collide with `taken`.
fn collision_renames(
    source: &Document,
    roots: impl Iterator<Item = NodeId>,
    taken: &FxHashSet<String>,
    used: &mut FxHashSet<String>,
) -> FxHashMap<String, String> {
    let mut renames = FxHashMap::default();
    for node in roots.flat_map(|root| source.subtree(root)) {
        let Some(id) = source.element(node).and_then(Element::id) else {
            continue;
        };
        if taken.contains(id) && !renames.contains_key(id) {
            renames.insert(id.to_string(), fresh_name(id, used));
        }
    }
    renames
}

/// `base` with every id of `ids` moved to a name nothing uses yet.
fn repeat_renames(
    base: &FxHashMap<String, String>,
    ids: &[String],
    used: &mut FxHashSet<String>,
) -> FxHashMap<String, String> {
    let mut renames = base.clone();
    for id in ids {
        let current = base.get(id).unwrap_or(id);
        let fresh = fresh_name(current, used);
        renames.insert(id.clone(), fresh);
    }
    renames
}

/// First free `<id>-<n>`, marked as used.
fn fresh_name(id: &str, used: &mut FxHashSet<String>) -> String {
    let fresh = (1..)
        .map(|n| format!("{id}-{n}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_default();
    used.insert(fresh.clone());
    fresh
}

/// Distinct ids under `roots`, in document order.
fn ids_in(source: &Document, roots: &[NodeId]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    roots
        .iter()
        .flat_map(|&root| source.subtree(root))
        .filter_map(|node| source.element(node).and_then(Element::id))
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

fn import_renamed(
    doc: &mut Document,
    source: &Document,
    node: NodeId,
    renames: &FxHashMap<String, String>,
) -> Option<NodeId> {
    let copy = doc.import(source, node)?;
    let nodes = doc.subtree(copy);
    references::rename(doc, &nodes, renames);
    Some(copy)
}
