//! In-memory SVG documents.
//!
//! - [`document`]: arena tree, structural equality and hashing
//! - [`parse`]: text to tree
//! - [`numbers`]: rounding numbers inside attribute values
//! - [`selector`]: structural queries
//! - [`properties`]: presentation attributes and initial values
//! - [`references`]: `#id` / `url(#id)` discovery and rewriting
//! - [`serialize`]: tree to minified text

pub mod document;
pub mod error;
pub mod numbers;
mod parse;
pub mod properties;
pub mod references;
pub mod selector;
pub mod serialize;

pub use document::{Document, Element, Likeness, NodeId, NodeKind};
pub use error::{NamespaceCollisionError, ParseError, SelectorError};
pub use selector::Selector;
pub use serialize::serialize;
