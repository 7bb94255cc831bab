//! Per-field validation against the brand tables.
//!
//! Each validator returns the upper snake code integrators match on. The
//! registry runs all of them during card extraction so a submission reports
//! every failing field at once.

use std::collections::HashSet;

use card_brands::{BrandCode, BrandProfile, CardVendor, luhn_valid, normalize, profile_or_default};
use cardfields_types::{CardError, Expiry};
use chrono::{DateTime, Utc};

/// Longest cardholder name the processor accepts.
pub const MAX_NAME_LENGTH: usize = 255;

/// Shortest postal code accepted when the field is filled in.
pub const MIN_POSTAL_LENGTH: usize = 3;

/// Validates a card number and returns the detected brand.
///
/// The number must detect as a known brand, pass the Luhn checksum, and
/// have one of the brand's accepted lengths. When `eligible` is present the
/// detected brand's vendor must be in it; `None` means the merchant has no
/// vendor restriction.
pub fn validate_number(
    value: &str,
    eligible: Option<&HashSet<CardVendor>>,
) -> Result<BrandCode, CardError> {
    let digits = normalize(value);
    let brand = card_brands::detect(&digits).ok_or(CardError::InvalidNumber)?;
    if let Some(eligible) = eligible {
        if !eligible.contains(&brand.vendor()) {
            return Err(CardError::IneligibleCardVendor);
        }
    }
    if !luhn_valid(&digits) || !brand.lengths().contains(&digits.len()) {
        return Err(CardError::InvalidNumber);
    }
    Ok(brand)
}

/// Validates an expiry string: it must parse and not be in the past.
pub fn validate_expiry(value: &str, now: DateTime<Utc>) -> Result<Expiry, CardError> {
    let expiry: Expiry = value.parse().map_err(|_| CardError::InvalidExpiry)?;
    if expiry.is_past(now) {
        return Err(CardError::InvalidExpiry);
    }
    Ok(expiry)
}

/// Validates a security code against the detected brand's rule.
///
/// Falls back to the unknown-brand profile (three digits) when detection
/// found nothing, so a bad number still gets an accurate CVV report.
pub fn validate_cvv(value: &str, brand: Option<BrandCode>) -> Result<(), CardError> {
    let profile: BrandProfile = profile_or_default(brand);
    let ok = value.len() == profile.security_code.size
        && value.bytes().all(|b| b.is_ascii_digit());
    if ok { Ok(()) } else { Err(CardError::InvalidCvv) }
}

/// Validates a cardholder name. Empty is fine; the field is optional.
pub fn validate_name(value: &str) -> Result<(), CardError> {
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(CardError::InvalidName);
    }
    Ok(())
}

/// Validates a postal code.
///
/// An empty value only fails when the merchant requires the field; a filled
/// value must reach the minimum length.
pub fn validate_postal(value: &str, required: bool) -> Result<(), CardError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return if required { Err(CardError::InvalidPostal) } else { Ok(()) };
    }
    if trimmed.chars().count() < MIN_POSTAL_LENGTH {
        return Err(CardError::InvalidPostal);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn vendors(list: &[CardVendor]) -> HashSet<CardVendor> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_validate_number_accepts_known_cards() {
        assert_eq!(
            validate_number("4111 1111 1111 1111", None),
            Ok(BrandCode::Visa)
        );
        assert_eq!(
            validate_number("378282246310005", None),
            Ok(BrandCode::AmericanExpress)
        );
    }

    #[test]
    fn test_validate_number_rejects_bad_luhn() {
        assert_eq!(
            validate_number("4111111111111112", None),
            Err(CardError::InvalidNumber)
        );
    }

    #[test]
    fn test_validate_number_rejects_wrong_length() {
        // Valid Luhn but fifteen digits is not a Visa length
        assert_eq!(
            validate_number("411111111111116", None),
            Err(CardError::InvalidNumber)
        );
    }

    #[test]
    fn test_validate_number_rejects_unknown_brand() {
        assert_eq!(
            validate_number("9999999999999995", None),
            Err(CardError::InvalidNumber)
        );
    }

    #[test]
    fn test_validate_number_vendor_eligibility() {
        let only_visa = vendors(&[CardVendor::Visa]);
        assert_eq!(
            validate_number("4111111111111111", Some(&only_visa)),
            Ok(BrandCode::Visa)
        );
        assert_eq!(
            validate_number("5555555555554444", Some(&only_visa)),
            Err(CardError::IneligibleCardVendor)
        );
        assert_eq!(
            validate_number("4111111111111111", Some(&HashSet::new())),
            Err(CardError::IneligibleCardVendor)
        );
    }

    #[test]
    fn test_validate_expiry() {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        assert!(validate_expiry("11 / 27", now).is_ok());
        assert!(validate_expiry("08/26", now).is_ok());
        assert_eq!(validate_expiry("07/26", now), Err(CardError::InvalidExpiry));
        assert_eq!(validate_expiry("13/27", now), Err(CardError::InvalidExpiry));
        assert_eq!(validate_expiry("soon", now), Err(CardError::InvalidExpiry));
    }

    #[test]
    fn test_validate_cvv_uses_brand_size() {
        assert!(validate_cvv("123", Some(BrandCode::Visa)).is_ok());
        assert_eq!(
            validate_cvv("1234", Some(BrandCode::Visa)),
            Err(CardError::InvalidCvv)
        );
        // American Express uses a four-digit CID
        assert!(validate_cvv("1234", Some(BrandCode::AmericanExpress)).is_ok());
        assert_eq!(
            validate_cvv("123", Some(BrandCode::AmericanExpress)),
            Err(CardError::InvalidCvv)
        );
    }

    #[test]
    fn test_validate_cvv_unknown_brand_falls_back_to_three() {
        assert!(validate_cvv("123", None).is_ok());
        assert_eq!(validate_cvv("1234", None), Err(CardError::InvalidCvv));
        assert_eq!(validate_cvv("12a", None), Err(CardError::InvalidCvv));
    }

    #[test]
    fn test_validate_name_length() {
        assert!(validate_name("").is_ok());
        assert!(validate_name("Ada Lovelace").is_ok());
        assert_eq!(
            validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)),
            Err(CardError::InvalidName)
        );
    }

    #[test]
    fn test_validate_postal() {
        assert!(validate_postal("", false).is_ok());
        assert_eq!(validate_postal("", true), Err(CardError::InvalidPostal));
        assert_eq!(validate_postal("  ", true), Err(CardError::InvalidPostal));
        assert_eq!(validate_postal("95", false), Err(CardError::InvalidPostal));
        assert!(validate_postal("95131", true).is_ok());
        assert!(validate_postal("K1A", false).is_ok());
    }
}
