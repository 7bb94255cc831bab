//! Card field and card value domain model.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// The individual inputs a card form can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Card number field
    Number,
    /// Expiration date field
    Expiry,
    /// Security code field
    Cvv,
    /// Cardholder name field
    Name,
    /// Postal code field
    Postal,
}

impl FieldKind {
    /// Every field kind, in display order.
    pub fn all() -> &'static [FieldKind] {
        &[
            FieldKind::Number,
            FieldKind::Expiry,
            FieldKind::Cvv,
            FieldKind::Name,
            FieldKind::Postal,
        ]
    }

    /// Fields a submission cannot proceed without.
    pub fn required() -> &'static [FieldKind] {
        &[FieldKind::Number, FieldKind::Expiry, FieldKind::Cvv]
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Number => write!(f, "number"),
            FieldKind::Expiry => write!(f, "expiry"),
            FieldKind::Cvv => write!(f, "cvv"),
            FieldKind::Name => write!(f, "name"),
            FieldKind::Postal => write!(f, "postal"),
        }
    }
}

/// Error returned when an expiry string cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExpiryError {
    /// The input does not match any accepted expiry format.
    #[error("unrecognized expiry format")]
    Format,
    /// The month component is outside 1-12.
    #[error("expiry month must be between 1 and 12")]
    MonthOutOfRange,
}

/// A card expiration date.
///
/// Parses the formats card holders actually type: `MM / YY`, `MM/YY`,
/// `MM/YYYY`, `MM-YY`, `MM-YYYY` and the bare digit runs `MMYY` / `MMYYYY`.
/// Two-digit years are taken as 20YY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Expiry {
    month: u32,
    year: i32,
}

impl Expiry {
    /// Creates an expiry from month and four-digit year.
    pub fn new(month: u32, year: i32) -> Result<Self, ExpiryError> {
        if !(1..=12).contains(&month) {
            return Err(ExpiryError::MonthOutOfRange);
        }
        Ok(Self { month, year })
    }

    /// The expiry month, 1-12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The four-digit expiry year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Whether the card is expired at `now`. Cards stay valid through the
    /// last day of their expiry month.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.year < now.year() || (self.year == now.year() && self.month < now.month())
    }

    /// Formats the expiry in the processor's `YYYY-MM` wire form.
    pub fn to_wire(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl std::fmt::Display for Expiry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

impl std::str::FromStr for Expiry {
    type Err = ExpiryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let (month_part, year_part) = if let Some(split) = compact.split_once(['/', '-']) {
            split
        } else if compact.is_ascii() && (compact.len() == 4 || compact.len() == 6) {
            // split_at takes a byte index
            compact.split_at(2)
        } else {
            return Err(ExpiryError::Format);
        };
        if month_part.is_empty() || month_part.len() > 2 {
            return Err(ExpiryError::Format);
        }
        let month: u32 = month_part.parse().map_err(|_| ExpiryError::Format)?;
        let year: i32 = match year_part.len() {
            2 => 2000 + year_part.parse::<i32>().map_err(|_| ExpiryError::Format)?,
            4 => year_part.parse().map_err(|_| ExpiryError::Format)?,
            _ => return Err(ExpiryError::Format),
        };
        Self::new(month, year)
    }
}

/// A complete set of values captured from the card fields.
///
/// Number and security code never appear in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Card {
    /// Card number as typed, possibly with gaps or dashes
    pub number: String,
    /// Expiration date
    pub expiry: Expiry,
    /// Security code
    pub cvv: String,
    /// Cardholder name, when the field is mounted
    pub name: Option<String>,
    /// Postal code, when the field is mounted
    pub postal_code: Option<String>,
}

impl Card {
    /// The last four digits of the card number, for display.
    pub fn last_four(&self) -> String {
        let digits = card_brands::normalize(&self.number);
        let skip = digits.chars().count().saturating_sub(4);
        digits.chars().skip(skip).collect()
    }
}

impl std::fmt::Debug for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Card")
            .field("number", &"<redacted>")
            .field("expiry", &self.expiry)
            .field("cvv", &"<redacted>")
            .field("name", &self.name)
            .field("postal_code", &self.postal_code)
            .finish()
    }
}
