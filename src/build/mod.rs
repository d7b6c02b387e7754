//! Unit building.
//!
//! A unit is one (icon, size) pair. Building it is a straight line:
//!
//! - **Load** - base canvas and template, parsed
//! - **Compose** - template merge, replacements, edits, removal
//! - **Optimize** - the ten-pass pipeline
//! - **Serialize** - minified, prefix-free text
//!
//! Units share nothing mutable. A batch runs them on the rayon pool and a
//! failing unit only fails its own report.

pub mod error;
pub(crate) mod loader;

#[cfg(test)]
mod tests;

pub use error::BuildError;
pub use loader::{FsLoader, SourceLoader};

use crate::compose::{
    apply_attribute_edit, apply_class_edit, apply_replacement, merge_at, remove_css_suffix,
    remove_matching, strip_style_to_attrs,
};
use crate::optimize::{OptimizeOptions, optimize};
use crate::recipe::{INSERTION_POINT, Palette, Recipe};
use crate::svg::{Document, serialize};
use rayon::prelude::*;
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

/// Inputs every unit of a batch reads.
#[derive(Debug, Clone, Copy)]
pub struct Shared<'a> {
    pub palette: &'a Palette,
    pub options: &'a OptimizeOptions,
}

/// One (icon, size) pair of a batch.
#[derive(Debug, Clone, Copy)]
pub struct Unit<'a> {
    pub recipe: &'a Recipe,
    pub size: &'a str,
}

impl<'a> Unit<'a> {
    /// Every size of every recipe, recipes first.
    pub fn all(recipes: &'a [Recipe]) -> Vec<Self> {
        recipes
            .iter()
            .flat_map(|recipe| {
                recipe
                    .sizes
                    .iter()
                    .map(move |size| Unit { recipe, size })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Compose,
    Serialize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::Compose => "compose",
            Self::Serialize => "serialize",
        })
    }
}

/// A unit error and the stage that raised it.
#[derive(Debug)]
pub struct UnitFailure {
    pub stage: Stage,
    pub error: BuildError,
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.error)?;
        let mut source = self.error.source();
        while let Some(cause) = source {
            write!(f, ": {cause}")?;
            source = cause.source();
        }
        Ok(())
    }
}

/// Result of one unit, successful or not.
#[derive(Debug)]
pub struct UnitReport {
    pub icon: String,
    pub size: String,
    pub context: String,
    pub elapsed: Duration,
    /// Serialized document on success.
    pub outcome: Result<String, UnitFailure>,
}

/// Build every unit in parallel, calling `on_report` as each one finishes.
///
/// Reports come back in unit order regardless of completion order.
pub fn build_batch(
    units: &[Unit<'_>],
    shared: Shared<'_>,
    loader: &dyn SourceLoader,
    on_report: impl Fn(&UnitReport) + Sync,
) -> Vec<UnitReport> {
    units
        .par_iter()
        .map(|unit| {
            let report = build_unit(unit.recipe, unit.size, shared, loader);
            on_report(&report);
            report
        })
        .collect()
}

/// Build one unit.
pub fn build_unit(
    recipe: &Recipe,
    size: &str,
    shared: Shared<'_>,
    loader: &dyn SourceLoader,
) -> UnitReport {
    let start = Instant::now();
    let outcome = bake(recipe, size, shared, loader);
    UnitReport {
        icon: recipe.name.clone(),
        size: size.to_string(),
        context: recipe.context.clone(),
        elapsed: start.elapsed(),
        outcome,
    }
}

fn bake(
    recipe: &Recipe,
    size: &str,
    shared: Shared<'_>,
    loader: &dyn SourceLoader,
) -> Result<String, UnitFailure> {
    let mut doc = load(loader, &recipe.base_for(size)).map_err(at(Stage::Load))?;
    let template = load(loader, &recipe.template_for(size)).map_err(at(Stage::Load))?;

    compose(&mut doc, &template, recipe, size, shared.palette, loader)
        .map_err(at(Stage::Compose))?;
    crate::debug!("build"; "{}@{size} composed", recipe.name);

    optimize(&mut doc, shared.options);

    serialize(&doc)
        .map_err(BuildError::from)
        .map_err(at(Stage::Serialize))
}

fn at(stage: Stage) -> impl FnOnce(BuildError) -> UnitFailure {
    move |error| UnitFailure { stage, error }
}

fn load(loader: &dyn SourceLoader, path: &str) -> Result<Document, BuildError> {
    let text = loader.load(path).map_err(|source| BuildError::Source {
        path: path.to_string(),
        source,
    })?;
    Document::parse(&text).map_err(|source| BuildError::Parse {
        path: path.to_string(),
        source,
    })
}

/// Apply every recipe directive, in the fixed order.
fn compose(
    doc: &mut Document,
    template: &Document,
    recipe: &Recipe,
    size: &str,
    palette: &Palette,
    loader: &dyn SourceLoader,
) -> Result<(), BuildError> {
    merge_at(doc, INSERTION_POINT, template)?;
    for replacement in &recipe.replacements {
        apply_replacement(doc, &replacement.for_size(size), loader)?;
    }
    for edit in &recipe.class_edits {
        apply_class_edit(doc, edit)?;
    }
    strip_style_to_attrs(doc);
    for edit in &recipe.attribute_edits {
        apply_attribute_edit(doc, edit, palette)?;
    }
    remove_css_suffix(doc, &recipe.css_suffixes);
    remove_matching(doc, &recipe.remove)
}
