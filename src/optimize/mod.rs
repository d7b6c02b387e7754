//! The ten-pass optimizer.
//!
//! Passes run in a fixed order over one document. Every pass is total: it
//! never fails on a well-formed tree. Passes that compare values (defaults,
//! identity transforms, duplicate detection) compare them at the output
//! precision, so running the pipeline on its own output changes nothing.
//!
//! Once unused definitions are gone, the set of dangling references is
//! frozen: later passes rename or redirect ids atomically and must not leave
//! new dangling references behind. Debug builds assert this after each pass.

mod cleanup;
mod defs;
mod editor;
mod ids;
mod precision;


pub use cleanup::{remove_comments, remove_default_attrs, remove_redundant_attrs};
pub use defs::{recycle_identical_defs, recycle_identical_paths, remove_unused_definitions};
pub use editor::{remove_editor_attrs, remove_editor_only_ids};
pub use ids::optimise_ids;
pub use precision::optimise_attr_precision;

use crate::recipe::ReservedIds;
use crate::svg::{Document, NodeId, references};
use rustc_hash::FxHashSet;

/// Decimal places kept by [`optimise_attr_precision`] unless configured.
pub const DEFAULT_PRECISION: usize = 3;

/// Per-batch optimizer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeOptions {
    pub precision: usize,
    pub reserved: ReservedIds,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            reserved: ReservedIds::default(),
        }
    }
}

type Pass = fn(&mut Document, &OptimizeOptions);

/// Passes up to and including unused definition removal.
const EARLY_PASSES: &[(&str, Pass)] = &[
    ("remove_comments", |doc, _| remove_comments(doc)),
    ("remove_default_attrs", remove_default_attrs),
    ("remove_redundant_attrs", remove_redundant_attrs),
    ("remove_editor_only_ids", remove_editor_only_ids),
    ("remove_editor_attrs", |doc, _| remove_editor_attrs(doc)),
    ("remove_unused_definitions", remove_unused_definitions),
];

/// Passes that must keep every resolving reference resolving.
const LATE_PASSES: &[(&str, Pass)] = &[
    ("recycle_identical_defs", recycle_identical_defs),
    ("recycle_identical_paths", recycle_identical_paths),
    ("optimise_attr_precision", optimise_attr_precision),
    ("optimise_ids", optimise_ids),
];

/// Run the whole pipeline in place.
pub fn optimize(doc: &mut Document, options: &OptimizeOptions) {
    for (name, pass) in EARLY_PASSES {
        pass(doc, options);
        crate::debug!("optimize"; "{name} done");
    }

    let dangling = cfg!(debug_assertions).then(|| references::dangling_references(doc));
    for (name, pass) in LATE_PASSES {
        pass(doc, options);
        if let Some(expected) = &dangling {
            debug_assert_eq!(
                &references::dangling_references(doc),
                expected,
                "{name} broke a reference"
            );
        }
        crate::debug!("optimize"; "{name} done");
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Containers whose content is never rendered in place.
const NON_RENDERED_CONTAINERS: &[&str] = &[
    "defs",
    "symbol",
    "clipPath",
    "mask",
    "pattern",
    "marker",
    "linearGradient",
    "radialGradient",
    "filter",
];

fn in_non_rendered(doc: &Document, id: NodeId) -> bool {
    std::iter::once(id).chain(doc.ancestors(id)).any(|node| {
        doc.element(node)
            .is_some_and(|e| NON_RENDERED_CONTAINERS.contains(&e.local_name()))
    })
}

/// Elements whose inherited context is not their tree position: content of
/// non-rendered containers and referenced subtrees.
fn context_free(doc: &Document) -> FxHashSet<NodeId> {
    let referenced = references::referenced_ids(doc);
    let mut out = FxHashSet::default();
    for id in doc.elements() {
        if out.contains(&id) {
            continue;
        }
        let Some(element) = doc.element(id) else {
            continue;
        };
        let is_root = NON_RENDERED_CONTAINERS.contains(&element.local_name())
            || element.id().is_some_and(|value| referenced.contains(value));
        if is_root {
            out.extend(doc.subtree(id));
        }
    }
    out
}

/// Whether a `<style>` sheet may restyle elements behind their attributes.
fn has_stylesheet(doc: &Document) -> bool {
    doc.elements()
        .into_iter()
        .any(|id| doc.element(id).is_some_and(|e| e.is("style")))
}

/// Value of `name` on the nearest ancestor that sets it.
fn inherited_value<'a>(doc: &'a Document, id: NodeId, name: &str) -> Option<&'a str> {
    doc.ancestors(id)
        .find_map(|ancestor| doc.element(ancestor).and_then(|e| e.attrs.get(name)))
}

/// Whether any id in the subtree of `id` is reserved.
fn holds_reserved(doc: &Document, id: NodeId, reserved: &ReservedIds) -> bool {
    doc.subtree(id).into_iter().any(|node| {
        doc.element(node)
            .and_then(|e| e.id())
            .is_some_and(|value| reserved.contains(value))
    })
}
