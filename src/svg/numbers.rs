//! Number rounding inside attribute values.
//!
//! Numbers are rounded to a fixed count of decimals and written in their
//! shortest form: no trailing zeros, no leading zero, no `-0`, no exponent.
//! Path data is tokenized so compact arc flags (`a1 1 0 01.5.5`) survive.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][-+]?[0-9]+)?").unwrap());

/// Attributes holding lengths, coordinates or transforms.
const GEOMETRIC: &[&str] = &[
    "x", "y", "width", "height", "rx", "ry", "cx", "cy", "r", "fx", "fy", "fr", "x1", "y1", "x2",
    "y2", "dx", "dy", "points", "transform", "gradientTransform", "patternTransform", "viewBox",
    "stroke-width", "stroke-dasharray", "stroke-dashoffset", "refX", "refY", "markerWidth",
    "markerHeight", "offset", "stdDeviation",
];

const PATH_COMMANDS: &str = "MmLlHhVvCcSsQqTtAaZz";

#[inline]
pub fn is_geometric(name: &str) -> bool {
    name == "d" || GEOMETRIC.contains(&name)
}

/// Shortest decimal text of `value` rounded to `precision` decimals.
pub fn format_number(value: f64, precision: usize) -> String {
    let mut text = format!("{value:.precision$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if let Some(rest) = text.strip_prefix("0.") {
        text = format!(".{rest}");
    } else if let Some(rest) = text.strip_prefix("-0.") {
        text = format!("-.{rest}");
    }
    if text == "-0" || text.is_empty() {
        text = "0".to_string();
    }
    text
}

/// Round an attribute value when the attribute is geometric.
pub fn round_attribute<'a>(name: &str, value: &'a str, precision: usize) -> Cow<'a, str> {
    if name == "d" {
        return match round_path(value, precision) {
            Some(path) if path != value => Cow::Owned(path),
            _ => Cow::Borrowed(value),
        };
    }
    if is_geometric(name) {
        return round_numbers(value, precision);
    }
    Cow::Borrowed(value)
}

/// Round every number of a free-form list (`points`, transforms, lengths).
pub fn round_numbers(text: &str, precision: usize) -> Cow<'_, str> {
    let mut last_end = usize::MAX;
    let mut last_had_dot = true;
    let rounded = NUMBER.replace_all(text, |caps: &Captures<'_>| {
        let m = &caps[0];
        let Some(start) = caps.get(0).map(|m| m.start()) else {
            return m.to_string();
        };
        let formatted = m
            .parse::<f64>()
            .map(|value| format_number(value, precision))
            .unwrap_or_else(|_| m.to_string());
        // `1.0001.5` would otherwise merge into `1.5`
        let needs_space = start == last_end && formatted.starts_with('.') && !last_had_dot;
        last_end = start + m.len();
        last_had_dot = formatted.contains('.');
        if needs_space {
            format!(" {formatted}")
        } else {
            formatted
        }
    });
    match rounded {
        Cow::Owned(out) if out == text => Cow::Borrowed(text),
        other => other,
    }
}

/// Round path data, keeping commands as written. `None` on malformed data.
pub fn round_path(d: &str, precision: usize) -> Option<String> {
    let mut out = String::with_capacity(d.len());
    let mut chars = d.char_indices().peekable();
    let mut command = None;
    let mut index = 0usize;
    let mut previous: Option<String> = None;

    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_whitespace() || ch == ',' {
            chars.next();
            continue;
        }
        if ch.is_ascii_alphabetic() {
            if !PATH_COMMANDS.contains(ch) {
                return None;
            }
            chars.next();
            out.push(ch);
            command = Some(ch);
            index = 0;
            previous = None;
            continue;
        }
        command?;

        let is_flag = matches!(command, Some('a' | 'A')) && matches!(index % 7, 3 | 4);
        let token = if is_flag {
            chars.next();
            match ch {
                '0' | '1' => ch.to_string(),
                _ => return None,
            }
        } else {
            let m = NUMBER.find_at(d, pos).filter(|m| m.start() == pos)?;
            while chars.peek().is_some_and(|&(p, _)| p < m.end()) {
                chars.next();
            }
            format_number(m.as_str().parse().ok()?, precision)
        };

        if let Some(prev) = &previous
            && !(token.starts_with('-') || (token.starts_with('.') && prev.contains('.')))
        {
            out.push(' ');
        }
        out.push_str(&token);
        previous = Some(token);
        index += 1;
    }
    Some(out)
}
