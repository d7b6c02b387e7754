//! Class, attribute and removal directives.

use crate::build::BuildError;
use crate::recipe::{AttributeEdit, ClassEdit, Palette};
use crate::svg::{Document, Selector};

/// Characters trimmed from both ends of attribute values and palette entries.
const TRIMMED: &[char] = &['"', '\'', ' ', '\t', '\n', '\r'];

/// Apply a class directive to every matched element.
pub fn apply_class_edit(doc: &mut Document, edit: &ClassEdit) -> Result<(), BuildError> {
    let selector = Selector::parse(&edit.selector)?;
    for id in doc.select(&selector) {
        let Some(element) = doc.element_mut(id) else {
            continue;
        };
        let classes = edit.directive.apply(element.classes()).join(" ");
        if classes.is_empty() {
            element.attrs.remove("class");
        } else {
            element.attrs.set("class", classes);
        }
    }
    Ok(())
}

/// Set attributes on every matched element, resolving `@alias` values.
pub fn apply_attribute_edit(
    doc: &mut Document,
    edit: &AttributeEdit,
    palette: &Palette,
) -> Result<(), BuildError> {
    let selector = Selector::parse(&edit.selector)?;
    let resolved: Vec<(&str, String)> = edit
        .attrs
        .iter()
        .map(|(name, value)| (name.as_str(), resolve_alias(value, palette)))
        .collect();

    for id in doc.select(&selector) {
        if let Some(element) = doc.element_mut(id) {
            for (name, value) in &resolved {
                element.attrs.set(*name, value.clone());
            }
        }
    }
    Ok(())
}

/// Trim quotes and whitespace, then look `@name` up in the palette.
///
/// Unknown aliases resolve to the trimmed literal.
pub fn resolve_alias(value: &str, palette: &Palette) -> String {
    let value = value.trim_matches(TRIMMED);
    value
        .strip_prefix('@')
        .and_then(|name| palette.get(name))
        .map_or(value, |resolved| resolved.trim_matches(TRIMMED))
        .to_string()
}

/// Strip configured suffixes from class tokens, then drop duplicates.
pub fn remove_css_suffix(doc: &mut Document, suffixes: &[String]) {
    if suffixes.is_empty() {
        return;
    }
    for id in doc.elements() {
        let Some(element) = doc.element_mut(id) else {
            continue;
        };
        let Some(class) = element.attrs.get("class") else {
            continue;
        };

        let mut tokens: Vec<&str> = Vec::new();
        for token in class.split_whitespace() {
            let stripped = suffixes
                .iter()
                .find(|suffix| token.ends_with(suffix.as_str()))
                .map_or(token, |suffix| &token[..token.len() - suffix.len()]);
            // a bare suffix token strips to nothing
            if !stripped.is_empty() && !tokens.contains(&stripped) {
                tokens.push(stripped);
            }
        }

        let updated = tokens.join(" ");
        if updated.is_empty() {
            element.attrs.remove("class");
        } else if updated != class {
            element.attrs.set("class", updated);
        }
    }
}

/// Decompose every element matched by each selector, in order.
pub fn remove_matching(doc: &mut Document, selectors: &[String]) -> Result<(), BuildError> {
    for source in selectors {
        let selector = Selector::parse(source)?;
        for id in doc.select(&selector) {
            doc.decompose(id);
        }
    }
    Ok(())
}
