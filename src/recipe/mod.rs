//! Resolved build instructions.
//!
//! A [`Recipe`] is what the cookbook layer hands to the unit builder: every
//! default merged in, every directive parsed into a typed value. Selectors are
//! kept as written and parsed when a unit uses them, so a bad selector fails
//! only the units that need it.

mod palette;

pub use palette::{Palette, ReservedIds};

/// Placeholder substituted with the unit size in source paths.
pub const SIZE_PLACEHOLDER: &str = "{size}";

/// Selector of the node a template replaces.
pub const INSERTION_POINT: &str = "#content";

/// One icon, buildable at each of its sizes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recipe {
    pub name: String,
    /// Base canvas stem; the file for a size is `<base>.<size>.svg`.
    pub base: String,
    /// Template path, may contain `{size}`.
    pub template: String,
    pub sizes: Vec<String>,
    pub context: String,
    pub folder: String,
    pub aliases: Vec<String>,
    pub replacements: Vec<Replacement>,
    pub class_edits: Vec<ClassEdit>,
    pub attribute_edits: Vec<AttributeEdit>,
    /// Removal selectors, in application order.
    pub remove: Vec<String>,
    pub css_suffixes: Vec<String>,
}

impl Recipe {
    /// Base canvas path for one size.
    pub fn base_for(&self, size: &str) -> String {
        format!("{}.{size}.svg", self.base)
    }

    /// Template path for one size.
    pub fn template_for(&self, size: &str) -> String {
        with_size(&self.template, size)
    }
}

/// Substitute `{size}` in a path.
pub fn with_size(path: &str, size: &str) -> String {
    path.replace(SIZE_PLACEHOLDER, size)
}

// ============================================================================
// Directives
// ============================================================================

/// Replace every node matching `selector` with another document's content.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub selector: String,
    /// Source path, may contain `{size}`.
    pub source: String,
    pub placement: Option<Placement>,
}

impl Replacement {
    /// This replacement with `{size}` substituted in its source.
    pub fn for_size(&self, size: &str) -> Self {
        Self {
            source: with_size(&self.source, size),
            ..self.clone()
        }
    }
}

/// Keyword or numeric offsets of a replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub x: String,
    pub y: String,
}

/// Class list change for every node matching `selector`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEdit {
    pub selector: String,
    pub directive: ClassDirective,
}

/// Parsed class directive.
///
/// `"+a -b"` adds `a` and removes `b`; bare tokens (`"a b"`) replace the whole
/// list before additions and removals apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDirective {
    pub set: Option<Vec<String>>,
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl ClassDirective {
    pub fn parse(text: &str) -> Self {
        let mut directive = Self::default();
        for token in text.split_whitespace() {
            if let Some(class) = token.strip_prefix('+') {
                if !class.is_empty() {
                    directive.add.push(class.to_string());
                }
            } else if let Some(class) = token.strip_prefix('-') {
                if !class.is_empty() {
                    directive.remove.push(class.to_string());
                }
            } else {
                directive
                    .set
                    .get_or_insert_with(Vec::new)
                    .push(token.to_string());
            }
        }
        directive
    }

    /// Apply to an existing class list.
    pub fn apply<'a>(&'a self, current: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
        let mut classes: Vec<&str> = match &self.set {
            Some(set) => set.iter().map(String::as_str).collect(),
            None => current.collect(),
        };
        for class in &self.add {
            if !classes.contains(&class.as_str()) {
                classes.push(class);
            }
        }
        classes.retain(|class| !self.remove.iter().any(|removed| removed == class));
        classes
    }
}

/// Attribute overrides for every node matching `selector`.
///
/// Values are literals or `@alias` palette references, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEdit {
    pub selector: String,
    pub attrs: Vec<(String, String)>,
}
