//! Unit build errors.

use crate::compose::{ReplacementError, StructureError};
use crate::svg::{NamespaceCollisionError, ParseError, SelectorError};
use thiserror::Error;

/// Why one (icon, size) unit failed.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot read `{path}`")]
    Source {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document `{path}`")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Replacement(#[from] ReplacementError),

    #[error(transparent)]
    Namespace(#[from] NamespaceCollisionError),
}

impl BuildError {
    /// The selector or path the failure is about, if there is one.
    pub fn offender(&self) -> Option<&str> {
        match self {
            Self::Source { path, .. } | Self::Parse { path, .. } => Some(path),
            Self::Selector(e) => Some(&e.selector),
            Self::Structure(StructureError::InsertionPoint { selector, .. }) => Some(selector),
            Self::Structure(_) => None,
            Self::Replacement(
                ReplacementError::MissingSource { path, .. } | ReplacementError::EmptySource { path },
            ) => Some(path),
            Self::Replacement(ReplacementError::NoTarget { selector }) => Some(selector),
            Self::Replacement(ReplacementError::Placement { value }) => Some(value),
            Self::Namespace(e) => Some(&e.second),
        }
    }
}
