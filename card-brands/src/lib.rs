//! Card Network Metadata with Macro-Based Brand Generation
//!
//! This library is the declarative data layer for card-field validation:
//! per-brand formatting gaps, accepted number lengths, security-code rules
//! and IIN detection patterns. Brands are defined declaratively using a macro
//! that auto-generates marker types, trait impls and the runtime dispatch
//! enum.
//!
//! # Adding a New Brand
//! Add one line to the `define_brands!` macro invocation:
//! ```ignore
//! define_brands! {
//!     // ... existing brands ...
//!     Maestro => ("maestro", "Maestro", Maestro, &[4, 8, 12], &[16, 19], ("CVC", 3), &[(493698, 493698)]),
//! }
//! ```
//!
//! # Example
//! ```
//! use card_brands::{detect, luhn_valid, BrandCode};
//!
//! let brand = detect("4111 1111 1111 1111");
//! assert_eq!(brand, Some(BrandCode::Visa));
//! assert!(luhn_valid("4111111111111111"));
//!
//! // Per-brand metadata for input masking and CVV validation
//! let profile = BrandCode::AmericanExpress.profile();
//! assert_eq!(profile.security_code.size, 4);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Security Code Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Security-code rule for a brand: display name and required digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SecurityCode {
    /// Display name printed next to the input ("CVV", "CID", ...).
    pub name: &'static str,
    /// Required number of digits.
    pub size: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Brand Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait defining card-brand metadata.
///
/// Detection patterns are inclusive prefix ranges `(lo, hi)`; a plain prefix
/// is expressed as `(p, p)`. Range bounds always have the same digit count.
pub trait CardBrand: Default + Clone + Copy + Send + Sync + 'static {
    const CODE: &'static str;
    const NICE_NAME: &'static str;
    const VENDOR: CardVendor;
    const GAPS: &'static [usize];
    const LENGTHS: &'static [usize];
    const SECURITY_CODE: SecurityCode;
    const PATTERNS: &'static [(u32, u32)];
}

// ─────────────────────────────────────────────────────────────────────────────
// Processor-Side Vendor Codes
// ─────────────────────────────────────────────────────────────────────────────

/// Card vendor in the processor's spelling.
///
/// This is the wire form used for merchant eligibility checks; the detection
/// layer speaks [`BrandCode`] and maps onto this via [`BrandCode::vendor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardVendor {
    Amex,
    Discover,
    Elo,
    Hiper,
    Jcb,
    Mastercard,
    Cup,
    Visa,
}

impl CardVendor {
    /// All vendor codes known to the processor.
    pub fn all() -> &'static [CardVendor] {
        &[
            CardVendor::Amex,
            CardVendor::Discover,
            CardVendor::Elo,
            CardVendor::Hiper,
            CardVendor::Jcb,
            CardVendor::Mastercard,
            CardVendor::Cup,
            CardVendor::Visa,
        ]
    }
}

impl fmt::Display for CardVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CardVendor::Amex => "AMEX",
            CardVendor::Discover => "DISCOVER",
            CardVendor::Elo => "ELO",
            CardVendor::Hiper => "HIPER",
            CardVendor::Jcb => "JCB",
            CardVendor::Mastercard => "MASTERCARD",
            CardVendor::Cup => "CUP",
            CardVendor::Visa => "VISA",
        };
        write!(f, "{}", code)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime Brand Profile
// ─────────────────────────────────────────────────────────────────────────────

/// Flattened brand metadata for runtime consumers (validators, input masks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrandProfile {
    pub code: &'static str,
    pub nice_name: &'static str,
    pub gaps: &'static [usize],
    pub lengths: &'static [usize],
    pub security_code: SecurityCode,
}

/// Fallback profile applied when no brand matches the entered number.
pub const UNKNOWN_PROFILE: BrandProfile = BrandProfile {
    code: "unknown",
    nice_name: "Unknown",
    gaps: &[4, 8, 12],
    lengths: &[16],
    security_code: SecurityCode {
        name: "CVV",
        size: 3,
    },
};

/// Returns the profile for a detected brand, or [`UNKNOWN_PROFILE`] when
/// detection found nothing.
pub fn profile_or_default(detected: Option<BrandCode>) -> BrandProfile {
    detected.map(|brand| brand.profile()).unwrap_or(UNKNOWN_PROFILE)
}

/// Error returned when parsing an unrecognized brand code string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown card brand: {0}")]
pub struct UnknownBrand(pub String);

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines all brands, the BrandCode enum, and metadata accessors
// ─────────────────────────────────────────────────────────────────────────────

/// Macro to define card brands with auto-generated types and the runtime enum.
///
/// # Syntax
/// ```ignore
/// define_brands! {
///     BrandName => ("code", "Nice Name", VendorVariant, &[gaps], &[lengths], ("CODE_NAME", size), &[(lo, hi)]),
/// }
/// ```
#[macro_export]
macro_rules! define_brands {
    (
        $(
            $name:ident => ($code:literal, $nice:literal, $vendor:ident, $gaps:expr, $lengths:expr, ($sc_name:literal, $sc_size:expr), $patterns:expr)
        ),* $(,)?
    ) => {
        // ─────────────────────────────────────────────────────────────────────
        // Generate marker types and CardBrand trait impls
        // ─────────────────────────────────────────────────────────────────────
        $(
            #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name;

            impl CardBrand for $name {
                const CODE: &'static str = $code;
                const NICE_NAME: &'static str = $nice;
                const VENDOR: CardVendor = CardVendor::$vendor;
                const GAPS: &'static [usize] = $gaps;
                const LENGTHS: &'static [usize] = $lengths;
                const SECURITY_CODE: SecurityCode = SecurityCode {
                    name: $sc_name,
                    size: $sc_size,
                };
                const PATTERNS: &'static [(u32, u32)] = $patterns;
            }
        )*

        // ─────────────────────────────────────────────────────────────────────
        // Generate BrandCode enum for runtime operations
        // ─────────────────────────────────────────────────────────────────────
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum BrandCode {
            $(#[serde(rename = $code)] $name),*
        }

        impl BrandCode {
            pub fn code(&self) -> &'static str {
                match self {
                    $(BrandCode::$name => $code),*
                }
            }

            pub fn nice_name(&self) -> &'static str {
                match self {
                    $(BrandCode::$name => $nice),*
                }
            }

            /// Processor-side vendor code for this brand.
            pub fn vendor(&self) -> CardVendor {
                match self {
                    $(BrandCode::$name => CardVendor::$vendor),*
                }
            }

            pub fn gaps(&self) -> &'static [usize] {
                match self {
                    $(BrandCode::$name => $gaps),*
                }
            }

            pub fn lengths(&self) -> &'static [usize] {
                match self {
                    $(BrandCode::$name => $lengths),*
                }
            }

            pub fn security_code(&self) -> SecurityCode {
                match self {
                    $(BrandCode::$name => <$name as CardBrand>::SECURITY_CODE),*
                }
            }

            pub fn patterns(&self) -> &'static [(u32, u32)] {
                match self {
                    $(BrandCode::$name => $patterns),*
                }
            }

            /// Flattened metadata for this brand.
            pub fn profile(&self) -> BrandProfile {
                BrandProfile {
                    code: self.code(),
                    nice_name: self.nice_name(),
                    gaps: self.gaps(),
                    lengths: self.lengths(),
                    security_code: self.security_code(),
                }
            }

            pub fn all() -> &'static [BrandCode] {
                &[$(BrandCode::$name),*]
            }
        }

        impl std::fmt::Display for BrandCode {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl std::str::FromStr for BrandCode {
            type Err = UnknownBrand;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($code => Ok(BrandCode::$name),)*
                    _ => Err(UnknownBrand(s.to_string())),
                }
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// BRAND DEFINITIONS - detection patterns are IIN prefix ranges
// ─────────────────────────────────────────────────────────────────────────────

define_brands! {
    Visa => ("visa", "Visa", Visa, &[4, 8, 12], &[16, 18, 19], ("CVV", 3), &[
        (4, 4),
    ]),
    Mastercard => ("mastercard", "Mastercard", Mastercard, &[4, 8, 12], &[16], ("CVC", 3), &[
        (51, 55),
        (2221, 2229),
        (223, 229),
        (23, 26),
        (270, 271),
        (2720, 2720),
    ]),
    AmericanExpress => ("american-express", "American Express", Amex, &[4, 10], &[15], ("CID", 4), &[
        (34, 34),
        (37, 37),
    ]),
    Discover => ("discover", "Discover", Discover, &[4, 8, 12], &[16, 19], ("CID", 3), &[
        (6011, 6011),
        (65, 65),
        (644, 649),
    ]),
    Jcb => ("jcb", "JCB", Jcb, &[4, 8, 12], &[16, 17, 18, 19], ("CVV", 3), &[
        (2131, 2131),
        (1800, 1800),
        (3528, 3589),
    ]),
    UnionPay => ("unionpay", "UnionPay", Cup, &[4, 8, 12], &[14, 15, 16, 17, 18, 19], ("CVN", 3), &[
        (620, 620),
        (624, 626),
        (62100, 62182),
        (62184, 62187),
        (62185, 62197),
        (62200, 62205),
        (622010, 622999),
        (62207, 62209),
        (622126, 622925),
        (623, 626),
        (6270, 6270),
        (6272, 6272),
        (6276, 6276),
        (627700, 627779),
        (627781, 627799),
        (6282, 6289),
        (6291, 6291),
        (6292, 6292),
        (810, 810),
        (8110, 8131),
        (8132, 8151),
        (8152, 8163),
        (8164, 8171),
    ]),
    Elo => ("elo", "Elo", Elo, &[4, 8, 12], &[16], ("CVE", 3), &[
        (401178, 401178),
        (401179, 401179),
        (431274, 431274),
        (438935, 438935),
        (451416, 451416),
        (457393, 457393),
        (457631, 457631),
        (457632, 457632),
        (504175, 504175),
        (506699, 506778),
        (509000, 509999),
        (627780, 627780),
        (636297, 636297),
        (636368, 636368),
        (650031, 650033),
        (650035, 650051),
        (650405, 650439),
        (650485, 650538),
        (650541, 650598),
        (650700, 650718),
        (650720, 650727),
        (650901, 650978),
        (651652, 651679),
        (655000, 655019),
        (655021, 655058),
    ]),
    Hiper => ("hiper", "Hiper", Hiper, &[4, 8, 12], &[16], ("CVC", 3), &[
        (637095, 637095),
        (637568, 637568),
        (637599, 637599),
        (637609, 637609),
        (637612, 637612),
        (63737423, 63737423),
        (63743358, 63743358),
    ]),
}

// ─────────────────────────────────────────────────────────────────────────────
// Number Normalization & Detection
// ─────────────────────────────────────────────────────────────────────────────

/// Strips formatting gaps (spaces and dashes) from an entered card number.
pub fn normalize(number: &str) -> String {
    number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Detects the card brand from a (possibly partial) card number.
///
/// All brands are matched against their prefix patterns; the longest matching
/// pattern wins. Ties keep the earliest brand in declaration order. Returns
/// `None` for empty or non-numeric input and for numbers no pattern covers.
pub fn detect(number: &str) -> Option<BrandCode> {
    let digits = normalize(number);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut best: Option<(BrandCode, usize)> = None;
    for &brand in BrandCode::all() {
        for &(lo, hi) in brand.patterns() {
            if let Some(strength) = match_strength(&digits, lo, hi) {
                if best.is_none_or(|(_, s)| strength > s) {
                    best = Some((brand, strength));
                }
            }
        }
    }
    best.map(|(brand, _)| brand)
}

/// Match strength of a single pattern against the number, or `None` if the
/// pattern does not apply. Strength is the digit count of the pattern, so a
/// six-digit IIN range outranks a one-digit prefix.
fn match_strength(digits: &str, lo: u32, hi: u32) -> Option<usize> {
    let lo_s = lo.to_string();
    let strength = lo_s.len();
    let n = strength.min(digits.len());

    if lo == hi {
        (digits[..n] == lo_s[..n]).then_some(strength)
    } else {
        // Compare the leading digits numerically, clamping both bounds to the
        // digits available. Range bounds always have equal digit counts.
        let hi_s = hi.to_string();
        let head: u32 = digits[..n].parse().ok()?;
        let lo_clamped: u32 = lo_s[..n].parse().ok()?;
        let hi_clamped: u32 = hi_s[..n].parse().ok()?;
        (head >= lo_clamped && head <= hi_clamped).then_some(strength)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Luhn Checksum
// ─────────────────────────────────────────────────────────────────────────────

/// Luhn-10 checksum over a digits-only card number.
///
/// Returns `false` for empty input or input containing non-digits.
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

// ─────────────────────────────────────────────────────────────────────────────
// Display Formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Inserts spaces into a digits-only number at the given gap offsets.
///
/// ```
/// use card_brands::format_with_gaps;
/// assert_eq!(format_with_gaps("4111111111111111", &[4, 8, 12]), "4111 1111 1111 1111");
/// assert_eq!(format_with_gaps("378282246310005", &[4, 10]), "3782 822463 10005");
/// ```
pub fn format_with_gaps(digits: &str, gaps: &[usize]) -> String {
    let mut out = String::with_capacity(digits.len() + gaps.len());
    for (i, c) in digits.chars().enumerate() {
        if gaps.contains(&i) && i > 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
