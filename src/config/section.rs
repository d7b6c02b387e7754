//! Cookbook file sections, as written.
//!
//! # Example
//!
//! ```toml
//! [cookbook]
//! reserved-ids = ["current-color-scheme"]
//! remove-css-suffixes = ["-24"]
//! remove = ["#guides"]
//! precision = 3
//!
//! [defaults]
//! sizes = ["16", "22"]
//! context = "Actions"
//! folder = "actions"
//! base = "bases/square"
//!
//! [palette]
//! accent = "#3daee9"
//!
//! [recipes.edit-copy]
//! template = "templates/edit-copy.svg"
//! aliases = ["gtk-copy"]
//! classes = { "#content" = "+ColorScheme-Text" }
//! attrs = { "#badge" = { fill = "@accent" } }
//! replace = { "#badge" = "badges/plus.{size}.svg" }
//! ```
//!
//! Directive tables stay untyped here so their declaration order survives;
//! [`super::resolve`] checks their shape.

use serde::Deserialize;

/// Whole cookbook file.
///
/// Recipes are kept as raw values and deserialized one at a time, so unknown
/// keys are reported with the recipe they belong to.
#[derive(Debug, Default, Deserialize)]
pub struct CookbookFile {
    #[serde(default)]
    pub cookbook: CookbookSection,
    #[serde(default)]
    pub defaults: RecipeSection,
    #[serde(default)]
    pub palette: toml::Table,
    #[serde(default)]
    pub recipes: toml::Table,
}

/// `[cookbook]`: settings shared by every recipe.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CookbookSection {
    #[serde(default)]
    pub reserved_ids: Vec<String>,
    #[serde(default)]
    pub remove_css_suffixes: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
    pub precision: Option<usize>,
}

/// `[defaults]` and every `[recipes.<name>]`.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeSection {
    pub template: Option<String>,
    pub base: Option<String>,
    /// Strings or integers.
    pub sizes: Option<Vec<toml::Value>>,
    pub context: Option<String>,
    pub folder: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Selector to class directive.
    #[serde(default)]
    pub classes: toml::Table,
    /// Selector to a table of attribute values.
    #[serde(default)]
    pub attrs: toml::Table,
    /// Selector to a source path or `{ source, x, y }`.
    #[serde(default)]
    pub replace: toml::Table,
    #[serde(default)]
    pub remove: Vec<String>,
}
