//! Right-to-left selector matching.

use super::{AttrOp, Combinator, Complex, Compound, QualifiedName, Simple};
use crate::svg::document::{Document, Element, NodeId, NodeKind, local_name, prefix};

pub(super) fn matches_complex(doc: &Document, id: NodeId, complex: &Complex) -> bool {
    match complex.compounds.len() {
        0 => false,
        n => match_at(doc, id, complex, n - 1),
    }
}

/// Match `compounds[index]` against `id`, then walk left through the combinators.
fn match_at(doc: &Document, id: NodeId, complex: &Complex, index: usize) -> bool {
    if !matches_compound(doc, id, &complex.compounds[index]) {
        return false;
    }
    if index == 0 {
        return true;
    }

    let next = index - 1;
    match complex.combinators[next] {
        Combinator::Child => doc
            .parent(id)
            .is_some_and(|parent| match_at(doc, parent, complex, next)),
        Combinator::Descendant => doc
            .ancestors(id)
            .any(|ancestor| match_at(doc, ancestor, complex, next)),
        Combinator::Adjacent => previous_siblings(doc, id)
            .first()
            .is_some_and(|&sibling| match_at(doc, sibling, complex, next)),
        Combinator::Sibling => previous_siblings(doc, id)
            .into_iter()
            .any(|sibling| match_at(doc, sibling, complex, next)),
    }
}

/// Element siblings before `id`, nearest first.
fn previous_siblings(doc: &Document, id: NodeId) -> Vec<NodeId> {
    let Some(parent) = doc.parent(id) else {
        return Vec::new();
    };
    let mut siblings: Vec<NodeId> = doc
        .child_elements(parent)
        .take_while(|&sibling| sibling != id)
        .collect();
    siblings.reverse();
    siblings
}

fn matches_compound(doc: &Document, id: NodeId, compound: &Compound) -> bool {
    let Some(element) = doc.element(id) else {
        return false;
    };
    compound
        .parts
        .iter()
        .all(|simple| matches_simple(doc, id, element, simple))
}

fn matches_simple(doc: &Document, id: NodeId, element: &Element, simple: &Simple) -> bool {
    match simple {
        Simple::Universal => true,
        Simple::Type(name) => name_matches(name, &element.name),
        Simple::Id(value) => element.id() == Some(value.as_str()),
        Simple::Class(class) => element.has_class(class),
        Simple::Attribute { name, test } => element
            .attrs
            .iter()
            .filter(|(key, _)| name_matches(name, key))
            .any(|(_, value)| match test {
                None => true,
                Some((op, expected)) => attr_matches(*op, value, expected),
            }),
        Simple::Not(list) => !list
            .iter()
            .any(|complex| matches_complex(doc, id, complex)),
        Simple::Root => id == doc.root(),
        Simple::FirstChild => position(doc, id).is_none_or(|(index, _)| index == 0),
        Simple::LastChild => position(doc, id).is_none_or(|(index, len)| index + 1 == len),
        Simple::OnlyChild => position(doc, id).is_none_or(|(_, len)| len == 1),
        Simple::Empty => doc.children(id).iter().all(|&child| {
            matches!(doc.kind(child), Some(NodeKind::Comment(_)))
        }),
    }
}

/// Index of `id` among its parent's element children, and their count.
fn position(doc: &Document, id: NodeId) -> Option<(usize, usize)> {
    let parent = doc.parent(id)?;
    let siblings: Vec<NodeId> = doc.child_elements(parent).collect();
    let index = siblings.iter().position(|&sibling| sibling == id)?;
    Some((index, siblings.len()))
}

fn name_matches(pattern: &QualifiedName, qname: &str) -> bool {
    match pattern {
        // unprefixed names match the local part of any prefixed name
        QualifiedName::Plain(name) => qname == name || local_name(qname) == name,
        QualifiedName::AnyPrefix(local) => local_name(qname) == local,
        QualifiedName::Prefixed(ns, local) if ns.is_empty() => qname == local,
        QualifiedName::Prefixed(ns, local) => {
            prefix(qname) == Some(ns.as_str()) && local_name(qname) == local
        }
    }
}

fn attr_matches(op: AttrOp, value: &str, expected: &str) -> bool {
    match op {
        AttrOp::Equals => value == expected,
        AttrOp::Includes => value.split_whitespace().any(|token| token == expected),
        AttrOp::DashMatch => {
            value == expected
                || value
                    .strip_prefix(expected)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOp::Prefix => !expected.is_empty() && value.starts_with(expected),
        AttrOp::Suffix => !expected.is_empty() && value.ends_with(expected),
        AttrOp::Substring => !expected.is_empty() && value.contains(expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_matches() {
        let plain = QualifiedName::Plain("path".into());
        assert!(name_matches(&plain, "path"));
        assert!(name_matches(&plain, "svg:path"));
        assert!(name_matches(&plain, "inkscape:path"));
        assert!(!name_matches(&plain, "inkscape:paths"));

        let escaped = QualifiedName::Plain("sodipodi:namedview".into());
        assert!(name_matches(&escaped, "sodipodi:namedview"));
        assert!(!name_matches(&escaped, "namedview"));

        let any = QualifiedName::AnyPrefix("label".into());
        assert!(name_matches(&any, "inkscape:label"));
        assert!(name_matches(&any, "label"));

        let none = QualifiedName::Prefixed(String::new(), "href".into());
        assert!(name_matches(&none, "href"));
        assert!(!name_matches(&none, "xlink:href"));
    }

    #[test]
    fn test_attr_ops() {
        assert!(attr_matches(AttrOp::DashMatch, "en-US", "en"));
        assert!(!attr_matches(AttrOp::DashMatch, "english", "en"));
        assert!(attr_matches(AttrOp::Includes, "a b c", "b"));
        assert!(!attr_matches(AttrOp::Substring, "abc", ""));
        assert!(attr_matches(AttrOp::Suffix, "icon-24", "-24"));
    }
}
