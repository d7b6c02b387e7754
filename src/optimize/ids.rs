//! Pass 10: short ids.

use super::OptimizeOptions;
use crate::svg::{Document, references};
use rustc_hash::{FxHashMap, FxHashSet};

/// The `n`th token of `a, b, ..., z, aa, ab, ...`.
pub fn canonical_token(n: usize) -> String {
    let mut n = n + 1;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    out.iter().rev().map(|&b| b as char).collect()
}

/// Rename every non-reserved id to the shortest free token.
pub fn optimise_ids(doc: &mut Document, options: &OptimizeOptions) {
    let dangling: FxHashSet<String> = references::dangling_references(doc).into_iter().collect();
    let mut renames: FxHashMap<String, String> = FxHashMap::default();
    let mut next = 0;

    for id in doc.elements() {
        let Some(value) = doc.element(id).and_then(|e| e.id()) else {
            continue;
        };
        if options.reserved.contains(value) || renames.contains_key(value) {
            continue;
        }
        let token = loop {
            let token = canonical_token(next);
            next += 1;
            if !options.reserved.contains(&token) && !dangling.contains(&token) {
                break token;
            }
        };
        renames.insert(value.to_string(), token);
    }

    renames.retain(|from, to| from != to);
    let nodes = doc.subtree(doc.root());
    references::rename(doc, &nodes, &renames);
}
