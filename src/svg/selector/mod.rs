//! Structural selectors over a [`Document`].
//!
//! A small CSS selector dialect, enough to address nodes from recipes:
//!
//! | Form                          | Example                      |
//! |-------------------------------|------------------------------|
//! | type / universal / namespaced | `path`, `*`, `sodipodi\|namedview` |
//! | id / class                    | `#content`, `.ColorScheme-Text` |
//! | attribute                     | `[fill]`, `[inkscape\|groupmode=layer]`, `[d^="M0"]` |
//! | combinators                   | `svg > g`, `g path`, `a + b`, `a ~ b` |
//! | pseudo-classes                | `:not(defs)`, `:root`, `:first-child`, `:last-child`, `:only-child`, `:empty` |
//!
//! Matching never looks at styles: it is purely structural and read-only.

mod matching;
mod parse;

use super::document::{Document, NodeId};
use super::error::SelectorError;
use smallvec::SmallVec;

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

/// Compounds joined by combinators; `combinators[i]` sits between
/// `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
struct Complex {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    Adjacent,
    Sibling,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    parts: SmallVec<[Simple; 4]>,
}

#[derive(Debug, Clone, PartialEq)]
enum Simple {
    Universal,
    Type(QualifiedName),
    Id(String),
    Class(String),
    Attribute {
        name: QualifiedName,
        test: Option<(AttrOp, String)>,
    },
    Not(Vec<Complex>),
    Root,
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
}

/// `prefix|local` as written in a selector.
#[derive(Debug, Clone, PartialEq)]
enum QualifiedName {
    /// No `|`: plain name.
    Plain(String),
    /// `*|local`: any prefix.
    AnyPrefix(String),
    /// `ns|local`; an empty prefix (`|local`) means "no prefix".
    Prefixed(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    /// `=`
    Equals,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            alternatives: parse::parse_list(source)?,
        })
    }

    /// Whether element `id` matches any alternative.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        doc.element(id).is_some()
            && self
                .alternatives
                .iter()
                .any(|complex| matching::matches_complex(doc, id, complex))
    }
}

impl Document {
    /// All elements matching `selector`, root included, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    /// Parse and run `selector` over the whole document.
    #[cfg(test)]
    pub fn query(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        Ok(self.select(&Selector::parse(selector)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
        <defs><linearGradient id="grad"/></defs>
        <g id="layer1" inkscape:groupmode="layer" class="ColorScheme-Text main">
            <path id="p1" d="M0 0" class="ColorScheme-Text"/>
            <rect id="r1" x="1"/>
            <path id="p2" d="M1 1"/>
        </g>
        <g id="content"/>
    </svg>"##;

    fn ids(doc: &Document, selector: &str) -> Vec<String> {
        doc.query(selector)
            .unwrap()
            .into_iter()
            .map(|id| doc.element(id).unwrap().id().unwrap_or("").to_string())
            .collect()
    }

    #[test]
    fn test_simple_selectors() {
        let doc = Document::parse(ICON).unwrap();
        assert_eq!(ids(&doc, "#content"), vec!["content"]);
        assert_eq!(ids(&doc, "path"), vec!["p1", "p2"]);
        assert_eq!(ids(&doc, ".ColorScheme-Text"), vec!["layer1", "p1"]);
        assert_eq!(ids(&doc, "[x]"), vec!["r1"]);
        assert_eq!(ids(&doc, "path[d='M1 1']"), vec!["p2"]);
        assert_eq!(ids(&doc, "[d^=M]"), vec!["p1", "p2"]);
        assert_eq!(ids(&doc, "[class~=main]"), vec!["layer1"]);
        assert_eq!(ids(&doc, "[inkscape|groupmode=layer]"), vec!["layer1"]);
        assert_eq!(ids(&doc, "[*|groupmode]"), vec!["layer1"]);
    }

    #[test]
    fn test_combinators_and_negation() {
        let doc = Document::parse(ICON).unwrap();
        assert_eq!(ids(&doc, "svg > *:not(defs)"), vec!["layer1", "content"]);
        assert_eq!(ids(&doc, "svg path"), vec!["p1", "p2"]);
        assert_eq!(ids(&doc, "svg > path"), Vec::<String>::new());
        assert_eq!(ids(&doc, "path + rect"), vec!["r1"]);
        assert_eq!(ids(&doc, "#p1 ~ path"), vec!["p2"]);
        assert_eq!(ids(&doc, "g > :first-child, g > :last-child"), vec!["p1", "p2"]);
        assert_eq!(ids(&doc, "g:empty"), vec!["content"]);
        assert_eq!(ids(&doc, ":root").len(), 1);
    }

    #[test]
    fn test_unprefixed_names_match_prefixed_nodes() {
        let doc = Document::parse(
            r#"<svg xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd"><sodipodi:namedview id="nv" sodipodi:docname="a.svg"/><metadata id="m"/></svg>"#,
        )
        .unwrap();
        assert_eq!(ids(&doc, "namedview"), vec!["nv"]);
        assert_eq!(ids(&doc, "[docname]"), vec!["nv"]);
        assert_eq!(ids(&doc, "sodipodi|namedview, metadata"), vec!["nv", "m"]);
        assert_eq!(ids(&doc, "svg|namedview"), Vec::<String>::new());
    }

    #[test]
    fn test_zero_matches_is_not_an_error() {
        let doc = Document::parse(ICON).unwrap();
        assert!(doc.query("#missing").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["", "#", "a >", "[x", ":not(a", ":hover", "a,,b", "[x=\"y]"] {
            assert!(Selector::parse(bad).is_err(), "`{bad}` should not parse");
        }
    }
}
