//! Composition failures.

use thiserror::Error;

/// The base or template cannot host a merge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("insertion point `{selector}` matched {found} nodes, expected exactly one")]
    InsertionPoint { selector: String, found: usize },

    #[error("template root is <{0}>, expected <svg>")]
    TemplateRoot(String),

    #[error("template has no drawable content")]
    EmptyTemplate,
}

/// A replacement directive could not be carried out.
#[derive(Debug, Error)]
pub enum ReplacementError {
    #[error("replacement source `{path}` is missing")]
    MissingSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("replacement target `{selector}` matched nothing")]
    NoTarget { selector: String },

    #[error("replacement source `{path}` has no drawable content")]
    EmptySource { path: String },

    #[error("invalid placement `{value}` (expected left, center, right, top, bottom or a number)")]
    Placement { value: String },
}
