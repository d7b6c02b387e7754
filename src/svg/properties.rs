//! SVG property tables.

use rustc_hash::FxHashSet;
use std::sync::LazyLock;

/// Properties that have an equivalent presentation attribute.
static PRESENTATION: LazyLock<FxHashSet<&'static str>> = LazyLock::new(|| {
    [
        "alignment-baseline",
        "baseline-shift",
        "clip",
        "clip-path",
        "clip-rule",
        "color",
        "color-interpolation",
        "color-interpolation-filters",
        "color-profile",
        "color-rendering",
        "cursor",
        "direction",
        "display",
        "dominant-baseline",
        "enable-background",
        "fill",
        "fill-opacity",
        "fill-rule",
        "filter",
        "flood-color",
        "flood-opacity",
        "font-family",
        "font-size",
        "font-size-adjust",
        "font-stretch",
        "font-style",
        "font-variant",
        "font-weight",
        "glyph-orientation-horizontal",
        "glyph-orientation-vertical",
        "image-rendering",
        "isolation",
        "kerning",
        "letter-spacing",
        "lighting-color",
        "marker-end",
        "marker-mid",
        "marker-start",
        "mask",
        "mix-blend-mode",
        "opacity",
        "overflow",
        "paint-order",
        "pointer-events",
        "shape-rendering",
        "stop-color",
        "stop-opacity",
        "stroke",
        "stroke-dasharray",
        "stroke-dashoffset",
        "stroke-linecap",
        "stroke-linejoin",
        "stroke-miterlimit",
        "stroke-opacity",
        "stroke-width",
        "text-anchor",
        "text-decoration",
        "text-rendering",
        "unicode-bidi",
        "vector-effect",
        "visibility",
        "word-spacing",
        "writing-mode",
    ]
    .into_iter()
    .collect()
});

#[inline]
pub fn is_presentation(property: &str) -> bool {
    PRESENTATION.contains(property)
}

/// Inherited properties and the spellings of their initial value.
pub const INHERITED_DEFAULTS: &[(&str, &[&str])] = &[
    ("clip-rule", &["nonzero"]),
    ("color-interpolation", &["sRGB"]),
    ("color-interpolation-filters", &["linearRGB"]),
    ("color-rendering", &["auto"]),
    ("cursor", &["auto"]),
    ("direction", &["ltr"]),
    ("fill", &["#000", "#000000", "black"]),
    ("fill-opacity", &["1"]),
    ("fill-rule", &["nonzero"]),
    ("font-size-adjust", &["none"]),
    ("font-stretch", &["normal"]),
    ("font-style", &["normal"]),
    ("font-variant", &["normal"]),
    ("font-weight", &["normal", "400"]),
    ("image-rendering", &["auto"]),
    ("letter-spacing", &["normal"]),
    ("paint-order", &["normal"]),
    ("pointer-events", &["visiblePainted"]),
    ("shape-rendering", &["auto"]),
    ("stroke", &["none"]),
    ("stroke-dasharray", &["none"]),
    ("stroke-dashoffset", &["0"]),
    ("stroke-linecap", &["butt"]),
    ("stroke-linejoin", &["miter"]),
    ("stroke-miterlimit", &["4"]),
    ("stroke-opacity", &["1"]),
    ("stroke-width", &["1"]),
    ("text-anchor", &["start"]),
    ("text-rendering", &["auto"]),
    ("visibility", &["visible"]),
    ("word-spacing", &["normal"]),
];

/// Non-inherited presentation properties and their initial value.
pub const PRESENTATION_DEFAULTS: &[(&str, &str)] = &[
    ("baseline-shift", "baseline"),
    ("clip-path", "none"),
    ("display", "inline"),
    ("filter", "none"),
    ("flood-color", "black"),
    ("flood-opacity", "1"),
    ("isolation", "auto"),
    ("lighting-color", "white"),
    ("mask", "none"),
    ("mix-blend-mode", "normal"),
    ("opacity", "1"),
    ("stop-color", "black"),
    ("stop-opacity", "1"),
    ("vector-effect", "none"),
];

/// Element-specific attribute defaults.
pub const ELEMENT_DEFAULTS: &[(&str, &[(&str, &str)])] = &[
    ("svg", &[("x", "0"), ("y", "0"), ("preserveAspectRatio", "xMidYMid meet")]),
    ("rect", &[("x", "0"), ("y", "0")]),
    ("circle", &[("cx", "0"), ("cy", "0")]),
    ("ellipse", &[("cx", "0"), ("cy", "0")]),
    ("line", &[("x1", "0"), ("y1", "0"), ("x2", "0"), ("y2", "0")]),
    ("use", &[("x", "0"), ("y", "0")]),
    ("image", &[("x", "0"), ("y", "0")]),
    (
        "linearGradient",
        &[
            ("x1", "0"),
            ("y1", "0"),
            ("x2", "100%"),
            ("y2", "0"),
            ("gradientUnits", "objectBoundingBox"),
            ("spreadMethod", "pad"),
        ],
    ),
    (
        "radialGradient",
        &[
            ("cx", "50%"),
            ("cy", "50%"),
            ("r", "50%"),
            ("gradientUnits", "objectBoundingBox"),
            ("spreadMethod", "pad"),
        ],
    ),
    ("stop", &[("offset", "0")]),
    ("clipPath", &[("clipPathUnits", "userSpaceOnUse")]),
    (
        "mask",
        &[
            ("maskUnits", "objectBoundingBox"),
            ("maskContentUnits", "userSpaceOnUse"),
        ],
    ),
    (
        "pattern",
        &[
            ("patternUnits", "objectBoundingBox"),
            ("patternContentUnits", "userSpaceOnUse"),
        ],
    ),
    (
        "filter",
        &[
            ("filterUnits", "objectBoundingBox"),
            ("primitiveUnits", "userSpaceOnUse"),
        ],
    ),
    ("marker", &[("markerUnits", "strokeWidth"), ("refX", "0"), ("refY", "0")]),
];

/// Inherited properties without a fixed initial value.
const INHERITED_WITHOUT_DEFAULT: &[&str] = &["color", "font-family", "font-size"];

#[inline]
pub fn is_inherited(property: &str) -> bool {
    INHERITED_WITHOUT_DEFAULT.contains(&property) || inherited_default(property).is_some()
}

/// Spellings of the initial value of an inherited property.
pub fn inherited_default(property: &str) -> Option<&'static [&'static str]> {
    INHERITED_DEFAULTS
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, values)| *values)
}

/// Whether `value` equals `default`, comparing numbers numerically.
pub fn is_default_value(value: &str, default: &str) -> bool {
    let value = value.trim();
    if value == default {
        return true;
    }
    match (value.parse::<f64>(), default.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
