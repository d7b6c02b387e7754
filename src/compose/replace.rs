//! Replacement directives.

use super::ReplacementError;
use super::merge::{Fragment, splice};
use crate::build::{BuildError, SourceLoader};
use crate::recipe::{Placement, Replacement};
use crate::svg::{Document, Element, Selector};

/// Replace every node matched by the directive's selector with the content
/// of its source document.
pub fn apply_replacement(
    doc: &mut Document,
    replacement: &Replacement,
    loader: &dyn SourceLoader,
) -> Result<(), BuildError> {
    let selector = Selector::parse(&replacement.selector)?;
    let targets = doc.select(&selector);
    if targets.is_empty() {
        return Err(ReplacementError::NoTarget {
            selector: replacement.selector.clone(),
        }
        .into());
    }

    let path = &replacement.source;
    let text = loader
        .load(path)
        .map_err(|source| ReplacementError::MissingSource {
            path: path.clone(),
            source,
        })?;
    let source = Document::parse(&text).map_err(|source| BuildError::Parse {
        path: path.clone(),
        source,
    })?;

    let fragment = if source.root_element().is("svg") {
        Fragment::of(&source, source.root())
    } else {
        Fragment::single(source.root())
    };
    if fragment.drawables.is_empty() {
        return Err(ReplacementError::EmptySource { path: path.clone() }.into());
    }

    let wrapper = replacement
        .placement
        .as_ref()
        .map(translation)
        .transpose()?
        .flatten();
    splice(doc, &source, &fragment, &targets, wrapper.as_ref());
    Ok(())
}

/// `<g transform="translate(x y)">`, or `None` for a zero offset.
fn translation(placement: &Placement) -> Result<Option<Element>, ReplacementError> {
    let x = position_to_offset(&placement.x)?;
    let y = position_to_offset(&placement.y)?;
    if is_zero(&x) && is_zero(&y) {
        return Ok(None);
    }
    Ok(Some(
        Element::new("g").with_attr("transform", format!("translate({x} {y})")),
    ))
}

fn is_zero(offset: &str) -> bool {
    offset.parse::<f64>().is_ok_and(|value| value == 0.0)
}

/// Map a placement keyword to an offset.
///
/// Opposite edges share the same inset: `right`/`bottom` give `-1` like
/// `left`/`top`. Numbers pass through unchanged.
pub fn position_to_offset(position: &str) -> Result<String, ReplacementError> {
    let position = position.trim();
    match position {
        "left" | "top" => Ok("-1".to_string()),
        "center" => Ok("0".to_string()),
        "right" | "bottom" => Ok("-1".to_string()),
        number if number.parse::<f64>().is_ok_and(f64::is_finite) => Ok(number.to_string()),
        other => Err(ReplacementError::Placement {
            value: other.to_string(),
        }),
    }
}
