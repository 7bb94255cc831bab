//! Styling and placeholder configuration surface.
//!
//! These tables are the declarative contract with the embedding layer:
//! which CSS properties an integrator may set, the default look of both
//! field layouts, and the placeholder text shown in empty fields.

use crate::domain::FieldKind;

/// CSS properties an integrator may style, as camelCase/kebab-case pairs.
/// The sanitizer drops any property not listed here.
pub const FIELD_STYLE: &[(&str, &str)] = &[
    ("appearance", "appearance"),
    ("color", "color"),
    ("direction", "direction"),
    ("font", "font"),
    ("fontFamily", "font-family"),
    ("fontSizeAdjust", "font-size-adjust"),
    ("fontSize", "font-size"),
    ("fontStretch", "font-stretch"),
    ("fontStyle", "font-style"),
    ("fontVariantAlternates", "font-variant-alternates"),
    ("fontVariantCaps", "font-variant-caps"),
    ("fontVariantEastAsian", "font-variant-east-asian"),
    ("fontVariantLigatures", "font-variant-ligatures"),
    ("fontVariantNumeric", "font-variant-numeric"),
    ("fontVariant", "font-variant"),
    ("fontWeight", "font-weight"),
    ("letterSpacing", "letter-spacing"),
    ("lineHeight", "line-height"),
    ("opacity", "opacity"),
    ("outline", "outline"),
    ("padding", "padding"),
    ("paddingTop", "padding-top"),
    ("paddingRight", "padding-right"),
    ("paddingBottom", "padding-bottom"),
    ("paddingLeft", "padding-left"),
    ("textShadow", "text-shadow"),
    ("transition", "transition"),
    ("MozApperance", "-moz-appearance"),
    ("MozOsxFontSmoothing", "-moz-osx-font-smoothing"),
    ("MozTapHighlightColor", "-moz-tap-highlight-color"),
    ("MozTransition", "-moz-transition"),
    ("WebkitAppearance", "-webkit-appearance"),
    ("WebkitOsxFontSmoothing", "-webkit-osx-font-smoothing"),
    ("WebkitTapHighlightColor", "-webkit-tap-highlight-color"),
    ("WebkitTransition", "-webkit-transition"),
];

/// Looks up the kebab-case CSS property for an allow-listed style key.
/// Accepts either the camelCase key or the kebab-case property itself.
pub fn css_property_for(key: &str) -> Option<&'static str> {
    FIELD_STYLE
        .iter()
        .find(|(camel, kebab)| *camel == key || *kebab == key)
        .map(|(_, kebab)| *kebab)
}

/// Fields whose empty value never fails validation.
pub const OPTIONAL_CARD_FIELDS: &[FieldKind] = &[FieldKind::Name];

/// HTML attributes the embedding layer may forward onto an input.
pub const ALLOWED_ATTRIBUTES: &[&str] = &[
    "aria-invalid",
    "aria-required",
    "disabled",
    "placeholder",
];

/// Input mask for the expiry field.
pub const DEFAULT_EXPIRY_PATTERN: &str = "{{99}} / {{9999}}";

/// Expiry mask variant that zero-pads single-digit months.
pub const ZERO_PADDED_EXPIRY_PATTERN: &str = "0{{9}} / {{9999}}";

/// Selects the expiry input mask.
pub fn expiry_pattern(zero_padded: bool) -> &'static str {
    if zero_padded {
        ZERO_PADDED_EXPIRY_PATTERN
    } else {
        DEFAULT_EXPIRY_PATTERN
    }
}

/// Default placeholder text for a field.
pub fn default_placeholder(field: FieldKind) -> &'static str {
    match field {
        FieldKind::Number => "Card number",
        FieldKind::Expiry => "MM / YY",
        FieldKind::Cvv => "CVV",
        FieldKind::Name => "Cardholder Name (optional)",
        FieldKind::Postal => "Postal code",
    }
}

/// Which visual layout the form renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayout {
    /// All inputs inside one combined field
    Single,
    /// One field per input
    Multi,
}

/// A style rule: selector plus its property/value declarations.
pub type StyleRule = (&'static str, &'static [(&'static str, &'static str)]);

/// Base styles shared by both layouts.
pub const DEFAULT_STYLE: &[StyleRule] = &[
    (
        "html, body",
        &[
            ("background", "transparent"),
            ("font-family", "\"Helvetica Neue\", Helvetica, Arial, sans-serif"),
        ],
    ),
    ("body", &[("margin", "0"), ("padding", "0.375rem")]),
    (
        "input",
        &[
            ("border", "0.0625rem solid #909697"),
            ("border-radius", "0.25rem"),
            ("box-sizing", "border-box"),
            ("background", "#ffffff"),
            ("font-family", "inherit"),
            ("font-size", "1.125rem"),
            ("line-height", "1.5rem"),
            ("padding", "1.25rem 0.75rem"),
            ("width", "100%"),
        ],
    ),
    ("::placeholder", &[("color", "#687173"), ("opacity", "1")]),
    (".card-icons", &[("display", "none")]),
    (
        ".card-icon",
        &[
            ("width", "40px"),
            ("height", "24px"),
            ("pointer-events", "none"),
            ("position", "absolute"),
            ("top", "1.6875rem"),
            ("left", "1.1875rem"),
        ],
    ),
    (
        "input.card-field-number.display-icon",
        &[("padding-left", "calc(1.2rem + 40px)")],
    ),
    (
        "input.card-field-number.display-icon + .card-icon",
        &[("display", "block")],
    ),
    ("input.card-field-number + .card-icon", &[("display", "none")]),
];

/// Additional rules for the multi-field layout.
pub const DEFAULT_STYLE_MULTI: &[StyleRule] = &[
    (
        ":focus",
        &[
            ("border-color", "#000000"),
            ("box-shadow", "0 0 0 0.125rem #000000 inset, 0 0 0 0.375rem rgb(0 0 0 / 16%)"),
            ("outline", "none"),
        ],
    ),
    (
        ":focus.invalid",
        &[
            ("border-color", "#d9360b"),
            ("box-shadow", "0 0 0 0.125rem #d9360b inset, 0 0 0 0.375rem rgb(217 54 11 / 16%)"),
        ],
    ),
    (
        ".invalid",
        &[
            ("border-color", "#d9360b"),
            ("box-shadow", "0 0 0 0.0625rem #d9360b inset"),
            ("color", "#d9360b"),
        ],
    ),
];

/// Additional rules for the single-field layout.
pub const DEFAULT_STYLE_SINGLE: &[StyleRule] = &[
    (
        ".card-field",
        &[
            ("background", "#ffffff"),
            ("border", "0.0625rem solid #909697"),
            ("border-radius", "0.25rem"),
            ("box-sizing", "border-box"),
            ("display", "flex"),
            ("flex-direction", "row"),
            ("margin", "0"),
            ("padding", "0"),
        ],
    ),
    (
        ".focus",
        &[
            ("border-color", "#000000"),
            ("box-shadow", "0 0 0 0.125rem #000000 inset, 0 0 0 0.375rem rgb(0 0 0 / 16%)"),
        ],
    ),
    (
        ".focus.invalid",
        &[
            ("border-color", "#d9360b"),
            ("box-shadow", "0 0 0 0.125rem #d9360b inset, 0 0 0 0.375rem rgb(217 54 11 / 16%)"),
        ],
    ),
    (
        ".invalid",
        &[
            ("border-color", "#d9360b"),
            ("box-shadow", "0 0 0 0.0625rem #d9360b inset"),
            ("color", "#d9360b"),
        ],
    ),
    (
        "input",
        &[
            ("background", "transparent"),
            ("border", "none"),
            ("border-radius", "unset"),
            ("box-sizing", "content-box"),
            ("margin", "0"),
        ],
    ),
    (
        "input, input:focus",
        &[("border", "none"), ("box-shadow", "none"), ("outline", "none")],
    ),
    ("input.invalid", &[("border", "none"), ("box-shadow", "none")]),
    (
        "input.card-field-number",
        &[("flex", "1"), ("min-width", "4ch"), ("padding-right", "0.375rem")],
    ),
    (
        "input.card-field-expiry",
        &[
            ("padding-left", "0.375rem"),
            ("padding-right", "0.375rem"),
            ("text-align", "center"),
            ("width", "7ch"),
        ],
    ),
    (
        "input.card-field-cvv",
        &[("padding-left", "0.375rem"), ("text-align", "center"), ("width", "4ch")],
    ),
    (
        ".card-field-validation-error",
        &[
            ("align-items", "center"),
            ("color", "#515354"),
            ("display", "flex"),
            ("font-size", "0.875rem"),
            ("margin-top", "0.375rem"),
        ],
    ),
    (
        ".card-field-validation-error > svg",
        &[
            ("color", "#d9360b"),
            ("width", "24px"),
            ("height", "24px"),
            ("margin-right", "0.25rem"),
        ],
    ),
    (".card-field-validation-error.hidden", &[("visibility", "hidden")]),
];

/// Default rules for a layout: the shared base plus layout additions.
pub fn default_style(layout: FieldLayout) -> Vec<StyleRule> {
    let additions = match layout {
        FieldLayout::Single => DEFAULT_STYLE_SINGLE,
        FieldLayout::Multi => DEFAULT_STYLE_MULTI,
    };
    DEFAULT_STYLE.iter().chain(additions).copied().collect()
}
