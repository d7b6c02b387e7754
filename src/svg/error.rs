//! Errors raised by the document layer.

use thiserror::Error;

/// Malformed input document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed xml at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element (second is <{0}>)")]
    MultipleRoots(String),

    #[error("unexpected text outside the root element")]
    StrayText,

    #[error("unclosed element <{0}>")]
    Unclosed(String),
}

/// Unparsable selector string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid selector `{selector}`: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: String,
}

impl SelectorError {
    pub fn new(selector: &str, reason: impl Into<String>) -> Self {
        Self {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

/// Two attributes of one element map to the same name once prefixes are stripped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("attributes `{first}` and `{second}` of <{element}> collide as `{name}`")]
pub struct NamespaceCollisionError {
    pub element: String,
    pub name: String,
    pub first: String,
    pub second: String,
}
