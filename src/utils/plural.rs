//! Pluralization for summary lines.

/// Plural suffix of `noun` for a count
///
/// # Examples
///
/// - `plural_suffix(1, "icon")` -> `""` (1 icon)
/// - `plural_suffix(3, "icon")` -> `"s"` (3 icons)
/// - `plural_suffix(0, "alias")` -> `"es"` (0 aliases)
#[inline]
pub fn plural_suffix(count: usize, noun: &str) -> &'static str {
    if count == 1 {
        ""
    } else if ["s", "x", "sh", "ch"].iter().any(|end| noun.ends_with(end)) {
        "es"
    } else {
        "s"
    }
}

/// Format count with noun, handling pluralization
///
/// - `plural_count(1, "unit")` -> `"1 unit"`
/// - `plural_count(2, "alias")` -> `"2 aliases"`
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, plural_suffix(count, noun))
}
