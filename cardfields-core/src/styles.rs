//! Sanitization of integrator-supplied styles into CSS text.
//!
//! Integrator styles render inside the card field frame, next to the card
//! number itself, so they pass through two filters before anything is
//! emitted: properties must be on the [`FIELD_STYLE`] allow list, and
//! values and selectors must clear the injection blocklists. Filtering is
//! per declaration; a rule only disappears when its selector is blocked
//! or nothing in it survives.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use cardfields_types::constants::{css_property_for, default_style, FieldLayout};

/// Value patterns that smuggle extra rules or script into a declaration.
static VALUE_BLOCKLIST: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let patterns = [
        r";",
        r"[<>]",
        r"\\",
        r"(?i)@import",
        r"(?i)expression",
        r"(?i)javascript",
        r"(?i)url",
    ];
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
});

/// Selector patterns that escape the rule body or pull in other sheets.
static SELECTOR_BLOCKLIST: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let patterns = [r"^\s*$", r"(?i)supports", r"(?i)import", r"[{}]", r"<"];
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
});

/// Integrator style input: selector to property/value declarations.
/// Ordered maps keep the emitted CSS deterministic.
pub type RawStyle = BTreeMap<String, BTreeMap<String, String>>;

/// One rule that survived sanitization. Properties are normalized to their
/// kebab-case form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedRule {
    pub selector: String,
    pub declarations: Vec<(&'static str, String)>,
}

/// Whether a declaration value clears the injection blocklist.
pub fn value_allowed(value: &str) -> bool {
    !VALUE_BLOCKLIST.iter().any(|re| re.is_match(value))
}

/// Whether a selector clears the injection blocklist.
pub fn selector_allowed(selector: &str) -> bool {
    !SELECTOR_BLOCKLIST.iter().any(|re| re.is_match(selector))
}

/// Filters one rule.
///
/// Returns `None` when the selector is blocked or no declaration survives.
/// Surviving declarations keep their input order.
pub fn sanitize_rule<'a, I>(selector: &str, declarations: I) -> Option<SanitizedRule>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    if !selector_allowed(selector) {
        return None;
    }
    let declarations: Vec<(&'static str, String)> = declarations
        .into_iter()
        .filter_map(|(property, value)| {
            let property = css_property_for(property)?;
            value_allowed(value).then(|| (property, value.to_string()))
        })
        .collect();
    if declarations.is_empty() {
        return None;
    }
    Some(SanitizedRule {
        selector: selector.to_string(),
        declarations,
    })
}

/// Filters a whole integrator style map, dropping blocked rules.
pub fn sanitize_style(style: &RawStyle) -> Vec<SanitizedRule> {
    style
        .iter()
        .filter_map(|(selector, declarations)| {
            sanitize_rule(
                selector,
                declarations.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            )
        })
        .collect()
}

/// Renders sanitized rules as CSS text.
pub fn render_rules(rules: &[SanitizedRule]) -> String {
    let mut css = String::new();
    for rule in rules {
        css.push_str(&rule.selector);
        css.push_str(" {\n");
        for (property, value) in &rule.declarations {
            css.push_str(&format!("  {property}: {value};\n"));
        }
        css.push_str("}\n");
    }
    css
}

/// Renders the built-in default stylesheet for a layout.
///
/// These rules are ours, not integrator input, so they skip the property
/// allow list (the defaults use layout properties integrators may not).
pub fn default_sheet(layout: FieldLayout) -> String {
    let mut css = String::new();
    for (selector, declarations) in default_style(layout) {
        css.push_str(selector);
        css.push_str(" {\n");
        for (property, value) in declarations {
            css.push_str(&format!("  {property}: {value};\n"));
        }
        css.push_str("}\n");
    }
    css
}
