//! Recipe-driven edits of a base document.
//!
//! Operations, in the order a unit applies them:
//!
//! 1. [`merge_at`]: template content at the insertion point
//! 2. [`apply_replacement`]: per directive, all-or-nothing
//! 3. [`apply_class_edit`]
//! 4. [`strip_style_to_attrs`]: before attribute edits so overrides win
//! 5. [`apply_attribute_edit`]
//! 6. [`remove_css_suffix`]
//! 7. [`remove_matching`]

mod edit;
mod error;
mod merge;
mod replace;
mod style;

pub use edit::{apply_attribute_edit, apply_class_edit, remove_css_suffix, remove_matching};
pub use error::{ReplacementError, StructureError};
pub use merge::merge_at;
pub use replace::apply_replacement;
pub use style::strip_style_to_attrs;
