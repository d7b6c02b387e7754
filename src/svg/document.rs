//! Arena-owned SVG document tree.
//!
//! Nodes live in a slot vector and are addressed by [`NodeId`]. Every live
//! node except the root has exactly one parent, so the tree can be torn down
//! by vacating slots: [`Document::decompose`] frees a whole subtree at once.
//!
//! Cross references between nodes (`<use href="#a">`, `fill="url(#g)"`) are
//! plain id strings and never ownership edges; see [`super::references`].

use super::numbers::round_attribute;
use rustc_hash::FxHasher;
use std::borrow::Cow;
use std::hash::{Hash, Hasher};

// ============================================================================
// Identifiers and names
// ============================================================================

/// Index of a node slot inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Local part of a qualified name (`inkscape:label` -> `label`).
#[inline]
pub fn local_name(qname: &str) -> &str {
    qname.rsplit_once(':').map_or(qname, |(_, local)| local)
}

/// Namespace prefix of a qualified name, if any.
#[inline]
pub fn prefix(qname: &str) -> Option<&str> {
    qname.split_once(':').map(|(prefix, _)| prefix)
}

// ============================================================================
// Attributes
// ============================================================================

/// Ordered attribute list with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(key, _)| key == name)
    }

    /// Set an attribute, keeping its position when it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(pos).1)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.0.retain(|(key, value)| keep(key, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = (&str, &mut String)> {
        self.0.iter_mut().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (key, value) in iter {
            attrs.set(key, value);
        }
        attrs
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// An element: qualified name plus attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Attributes,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attributes::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(name, value);
        self
    }

    #[inline]
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    #[inline]
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    /// Whitespace separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs.get("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// Payload of a node slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

impl NodeKind {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Which differences [`Document::same_structure`] tolerates.
#[derive(Debug, Clone, Copy)]
pub struct Likeness {
    /// Ignore `id` attributes at every depth.
    pub ignore_ids: bool,
    /// Attributes ignored on the compared roots only.
    pub ignore_root_attrs: &'static [&'static str],
    /// Compare geometric values rounded to this many decimals.
    pub precision: Option<usize>,
}

impl Likeness {
    pub const EXACT: Self = Self {
        ignore_ids: false,
        ignore_root_attrs: &[],
        precision: None,
    };
    pub const IGNORE_IDS: Self = Self {
        ignore_ids: true,
        ignore_root_attrs: &[],
        precision: None,
    };

    pub const fn rounded(self, precision: usize) -> Self {
        Self {
            precision: Some(precision),
            ..self
        }
    }

    fn skips(&self, name: &str, at_root: bool) -> bool {
        (self.ignore_ids && name == "id") || (at_root && self.ignore_root_attrs.contains(&name))
    }

    /// Compared attributes of an element, sorted by name.
    fn signature<'a>(&self, attrs: &'a Attributes, at_root: bool) -> Vec<(&'a str, Cow<'a, str>)> {
        let mut pairs: Vec<_> = attrs
            .iter()
            .filter(|(key, _)| !self.skips(key, at_root))
            .map(|(key, value)| match self.precision {
                Some(precision) => (key, round_attribute(key, value, precision)),
                None => (key, Cow::Borrowed(value)),
            })
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

// ============================================================================
// Document
// ============================================================================

/// A mutable SVG tree with exactly one root element.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Option<Node>>,
    root: NodeId,
}

impl Document {
    /// Create a document holding only `root`.
    pub fn new(root: Element) -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.create(NodeKind::Element(root));
        doc
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_element(&self) -> &Element {
        self.element(self.root)
            .expect("document root is always a live element")
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    #[inline]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|node| &node.kind)
    }

    pub fn kind_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.get_mut(id).map(|node| &mut node.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.kind(id).and_then(NodeKind::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.get_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Element children of `id`, in order.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.element(child).is_some())
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Live nodes below `id` in document order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// `id` followed by its descendants.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        out.extend(self.descendants(id));
        out
    }

    /// Every element of the document in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.subtree(self.root)
            .into_iter()
            .filter(|&id| self.element(id).is_some())
            .collect()
    }

    /// First element in document order carrying `id="<value>"`.
    #[cfg(test)]
    pub fn find_id(&self, value: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|&id| self.element(id).and_then(Element::id) == Some(value))
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// First `defs` element in document order.
    pub fn first_defs(&self) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|&id| self.element(id).is_some_and(|e| e.is("defs")))
    }

    /// Concatenated text and CDATA below `id`.
    #[cfg(test)]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        for node in self.subtree(id) {
            match self.kind(node) {
                Some(NodeKind::Text(t) | NodeKind::CData(t)) => text.push_str(t),
                _ => {}
            }
        }
        text
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Allocate a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(u32::try_from(self.slots.len()).expect("node arena exceeds u32::MAX"));
        self.slots.push(Some(Node {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.create(NodeKind::Element(element))
    }

    /// Append a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_children(parent, len, &[child]);
    }

    /// Insert detached nodes into `parent` starting at `index`.
    pub fn insert_children(&mut self, parent: NodeId, index: usize, nodes: &[NodeId]) {
        for &node in nodes {
            self.detach(node);
            if let Some(slot) = self.get_mut(node) {
                slot.parent = Some(parent);
            }
        }
        if let Some(slot) = self.get_mut(parent) {
            let index = index.min(slot.children.len());
            slot.children.splice(index..index, nodes.iter().copied());
        }
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// Unlink `id` from its parent, keeping its subtree alive.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(slot) = self.get_mut(parent) {
            slot.children.retain(|&child| child != id);
        }
        if let Some(slot) = self.get_mut(id) {
            slot.parent = None;
        }
    }

    /// Detach `id` and free its whole subtree.
    ///
    /// Returns `false` for the root and for already vacant slots.
    pub fn decompose(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.is_alive(id) {
            return false;
        }
        self.detach(id);
        for node in self.subtree(id) {
            self.slots[node.index()] = None;
        }
        true
    }

    /// Put `nodes` where `target` was and free `target`.
    pub fn replace_with(&mut self, target: NodeId, nodes: &[NodeId]) -> bool {
        let (Some(parent), Some(index)) = (self.parent(target), self.index_in_parent(target))
        else {
            return false;
        };
        self.insert_children(parent, index, nodes);
        self.decompose(target)
    }

    /// Wrap `nodes` (detached) in a new element and return the wrapper.
    pub fn wrap(&mut self, element: Element, nodes: &[NodeId]) -> NodeId {
        let wrapper = self.create_element(element);
        self.insert_children(wrapper, 0, nodes);
        wrapper
    }

    /// First `defs` element, created as the root's first child if missing.
    pub fn ensure_defs(&mut self) -> NodeId {
        if let Some(defs) = self.first_defs() {
            return defs;
        }
        let defs = self.create_element(Element::new("defs"));
        self.insert_children(self.root, 0, &[defs]);
        defs
    }

    /// Deep copy of `id` as a detached subtree of this document.
    pub fn deep_clone(&mut self, id: NodeId) -> Option<NodeId> {
        let source = Owned::copy(self, id)?;
        Some(self.materialize(source))
    }

    /// Deep copy of `id` from another document as a detached subtree.
    pub fn import(&mut self, other: &Document, id: NodeId) -> Option<NodeId> {
        let source = Owned::copy(other, id)?;
        Some(self.materialize(source))
    }

    fn materialize(&mut self, owned: Owned) -> NodeId {
        let id = self.create(owned.kind);
        let children: Vec<NodeId> = owned
            .children
            .into_iter()
            .map(|child| self.materialize(child))
            .collect();
        self.insert_children(id, 0, &children);
        id
    }

    // ------------------------------------------------------------------------
    // Structural equality and hashing
    // ------------------------------------------------------------------------

    /// Structural equality of two subtrees of this document.
    pub fn same_structure(&self, a: NodeId, b: NodeId, likeness: Likeness) -> bool {
        same_structure(self, a, self, b, likeness, true)
    }

    /// Stable hash consistent with [`Document::same_structure`].
    pub fn structural_hash(&self, id: NodeId, likeness: Likeness) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash_into(id, likeness, true, &mut hasher);
        hasher.finish()
    }

    fn hash_into(&self, id: NodeId, likeness: Likeness, at_root: bool, hasher: &mut FxHasher) {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => {
                0u8.hash(hasher);
                element.name.hash(hasher);
                for pair in likeness.signature(&element.attrs, at_root) {
                    pair.hash(hasher);
                }
            }
            Some(NodeKind::Text(text)) => (1u8, text).hash(hasher),
            Some(NodeKind::CData(text)) => (2u8, text).hash(hasher),
            Some(NodeKind::Comment(text)) => (3u8, text).hash(hasher),
            None => return,
        }
        let children = self.children(id);
        children.len().hash(hasher);
        for &child in children {
            self.hash_into(child, likeness, false, hasher);
        }
    }
}

/// Structural equality across documents.
pub fn same_structure(
    doc_a: &Document,
    a: NodeId,
    doc_b: &Document,
    b: NodeId,
    likeness: Likeness,
    at_root: bool,
) -> bool {
    let (Some(kind_a), Some(kind_b)) = (doc_a.kind(a), doc_b.kind(b)) else {
        return false;
    };
    let kinds_match = match (kind_a, kind_b) {
        (NodeKind::Element(x), NodeKind::Element(y)) => {
            x.name == y.name
                && likeness.signature(&x.attrs, at_root) == likeness.signature(&y.attrs, at_root)
        }
        (x, y) => x == y,
    };
    if !kinds_match {
        return false;
    }
    let (children_a, children_b) = (doc_a.children(a), doc_b.children(b));
    children_a.len() == children_b.len()
        && children_a
            .iter()
            .zip(children_b)
            .all(|(&x, &y)| same_structure(doc_a, x, doc_b, y, likeness, false))
}

/// Detached owned copy used while moving subtrees between arenas.
struct Owned {
    kind: NodeKind,
    children: Vec<Owned>,
}

impl Owned {
    fn copy(from: &Document, id: NodeId) -> Option<Self> {
        let kind = from.kind(id)?.clone();
        let children = from
            .children(id)
            .iter()
            .filter_map(|&child| Self::copy(from, child))
            .collect();
        Some(Self { kind, children })
    }
}

/// Iterator over ancestors, nearest first.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new(Element::new("svg"));
        let root = doc.root();
        let g = doc.create_element(Element::new("g").with_attr("id", "layer1"));
        let a = doc.create_element(Element::new("path").with_attr("d", "M0 0"));
        let b = doc.create_element(Element::new("path").with_attr("d", "M1 1"));
        doc.append_child(root, g);
        doc.append_child(g, a);
        doc.append_child(g, b);
        (doc, g, a, b)
    }

    #[test]
    fn test_local_name_and_prefix() {
        assert_eq!(local_name("inkscape:label"), "label");
        assert_eq!(local_name("path"), "path");
        assert_eq!(prefix("xlink:href"), Some("xlink"));
        assert_eq!(prefix("href"), None);
    }

    #[test]
    fn test_attributes_keep_order_on_set() {
        let mut attrs: Attributes = [("a", "1"), ("b", "2")].into_iter().collect();
        attrs.set("a", "3");
        attrs.set("c", "4");
        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2"), ("c", "4")]);
        assert_eq!(attrs.remove("b").as_deref(), Some("2"));
        assert!(!attrs.contains("b"));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let (doc, g, a, b) = sample();
        assert_eq!(doc.descendants(doc.root()), vec![g, a, b]);
        assert_eq!(doc.ancestors(b).collect::<Vec<_>>(), vec![g, doc.root()]);
    }

    #[test]
    fn test_decompose_frees_subtree() {
        let (mut doc, g, a, b) = sample();
        assert!(doc.decompose(g));
        assert!(!doc.is_alive(g));
        assert!(!doc.is_alive(a));
        assert!(!doc.is_alive(b));
        assert!(doc.children(doc.root()).is_empty());
        // root and vacant slots are refused
        assert!(!doc.decompose(doc.root()));
        assert!(!doc.decompose(g));
    }

    #[test]
    fn test_replace_with_keeps_position() {
        let (mut doc, g, a, b) = sample();
        let x = doc.create_element(Element::new("circle"));
        let y = doc.create_element(Element::new("rect"));
        assert!(doc.replace_with(a, &[x, y]));
        assert_eq!(doc.children(g), &[x, y, b]);
        assert_eq!(doc.parent(x), Some(g));
    }

    #[test]
    fn test_structural_equality_ignores_ids_and_attr_order() {
        let mut doc = Document::new(Element::new("svg"));
        let root = doc.root();
        let a = doc.create_element(
            Element::new("linearGradient")
                .with_attr("id", "a")
                .with_attr("x1", "0")
                .with_attr("x2", "1"),
        );
        let b = doc.create_element(
            Element::new("linearGradient")
                .with_attr("x2", "1")
                .with_attr("x1", "0")
                .with_attr("id", "b"),
        );
        doc.append_child(root, a);
        doc.append_child(root, b);

        assert!(!doc.same_structure(a, b, Likeness::EXACT));
        assert!(doc.same_structure(a, b, Likeness::IGNORE_IDS));
        assert_eq!(
            doc.structural_hash(a, Likeness::IGNORE_IDS),
            doc.structural_hash(b, Likeness::IGNORE_IDS)
        );
        assert_ne!(
            doc.structural_hash(a, Likeness::EXACT),
            doc.structural_hash(b, Likeness::EXACT)
        );
    }

    #[test]
    fn test_rounded_likeness() {
        let mut doc = Document::new(Element::new("svg"));
        let root = doc.root();
        let a = doc.create_element(Element::new("rect").with_attr("width", "1.00001"));
        let b = doc.create_element(Element::new("rect").with_attr("width", "1"));
        doc.append_child(root, a);
        doc.append_child(root, b);

        assert!(!doc.same_structure(a, b, Likeness::EXACT));
        let rounded = Likeness::EXACT.rounded(3);
        assert!(doc.same_structure(a, b, rounded));
        assert_eq!(
            doc.structural_hash(a, rounded),
            doc.structural_hash(b, rounded)
        );
    }

    #[test]
    fn test_child_order_matters() {
        let (mut doc, g, _, _) = sample();
        let copy = doc.deep_clone(g).unwrap();
        let root = doc.root();
        doc.append_child(root, copy);
        assert!(doc.same_structure(g, copy, Likeness::EXACT));

        let children = doc.children(copy).to_vec();
        doc.detach(children[0]);
        doc.append_child(copy, children[0]);
        assert!(!doc.same_structure(g, copy, Likeness::EXACT));
    }

    #[test]
    fn test_import_from_other_document() {
        let (other, g, _, _) = sample();
        let mut doc = Document::new(Element::new("svg"));
        let imported = doc.import(&other, g).unwrap();
        let root = doc.root();
        doc.append_child(root, imported);
        assert_eq!(doc.descendants(root).len(), 3);
        assert_eq!(doc.find_id("layer1"), Some(imported));
    }
}
