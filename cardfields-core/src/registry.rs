//! Mounted-field state shared between the embedding layer and submissions.
//!
//! The embedding layer mounts fields, feeds keystrokes in, and may do so
//! from another task while a submission reads the form, so per-field state
//! lives in a concurrent map. Processor field errors from a declined submit
//! are written back here for the embedding layer to display.

use std::collections::HashSet;
use std::sync::{Mutex, RwLock};

use dashmap::DashMap;

use card_brands::CardVendor;
use cardfields_types::{ApiErrorCode, Card, FeatureFlags, FieldError, FieldKind};
use chrono::Utc;

use crate::validate;

/// Per-field state: the current value and any processor error codes the
/// last declined submit left on the field.
#[derive(Debug, Clone, Default)]
struct FieldState {
    value: String,
    api_errors: Vec<ApiErrorCode>,
}

/// Registry of mounted card fields for one form.
///
/// Shared between the embedding layer (mutating field state) and the
/// submission service (reading it), so all methods take `&self`.
pub struct FormRegistry {
    fields: DashMap<FieldKind, FieldState>,
    /// Processor errors that apply to the submission as a whole.
    form_errors: Mutex<Vec<ApiErrorCode>>,
    /// Vendors the merchant may accept; `None` means unrestricted.
    eligible_vendors: RwLock<Option<HashSet<CardVendor>>>,
}

impl Default for FormRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormRegistry {
    /// Creates an empty registry with no vendor restriction.
    pub fn new() -> Self {
        Self {
            fields: DashMap::new(),
            form_errors: Mutex::new(Vec::new()),
            eligible_vendors: RwLock::new(None),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Field Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Mounts a field with an empty value. Mounting twice keeps the state.
    pub fn mount(&self, kind: FieldKind) {
        self.fields.entry(kind).or_default();
    }

    /// Unmounts a field, dropping its value and errors.
    pub fn unmount(&self, kind: FieldKind) {
        self.fields.remove(&kind);
    }

    /// Whether a field is currently mounted.
    pub fn is_mounted(&self, kind: FieldKind) -> bool {
        self.fields.contains_key(&kind)
    }

    /// Mounted fields in display order.
    pub fn mounted(&self) -> Vec<FieldKind> {
        FieldKind::all()
            .iter()
            .copied()
            .filter(|kind| self.is_mounted(*kind))
            .collect()
    }

    /// Updates a mounted field's value.
    /// Returns false if the field is not mounted.
    pub fn set_value(&self, kind: FieldKind, value: impl Into<String>) -> bool {
        match self.fields.get_mut(&kind) {
            Some(mut state) => {
                state.value = value.into();
                true
            }
            None => false,
        }
    }

    /// The current value of a mounted field.
    pub fn value(&self, kind: FieldKind) -> Option<String> {
        self.fields.get(&kind).map(|state| state.value.clone())
    }

    /// Whether the fields a submission cannot proceed without are mounted.
    pub fn has_card_fields(&self) -> bool {
        FieldKind::required()
            .iter()
            .all(|kind| self.is_mounted(*kind))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Merchant Eligibility
    // ─────────────────────────────────────────────────────────────────────────

    /// Restricts submissions to the given card vendors.
    pub fn set_eligible_vendors(&self, vendors: impl IntoIterator<Item = CardVendor>) {
        let set: HashSet<CardVendor> = vendors.into_iter().collect();
        *self.eligible_vendors.write().unwrap() = Some(set);
    }

    /// Removes any vendor restriction.
    pub fn clear_eligible_vendors(&self) {
        *self.eligible_vendors.write().unwrap() = None;
    }

    /// The merchant's vendor restriction, when one is set.
    pub fn eligible_vendors(&self) -> Option<HashSet<CardVendor>> {
        self.eligible_vendors.read().unwrap().clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Processor Field Errors
    // ─────────────────────────────────────────────────────────────────────────

    /// Clears processor error codes from every field and from the form.
    /// Runs at the start of each submit so stale errors never linger.
    pub fn clear_api_errors(&self) {
        for mut entry in self.fields.iter_mut() {
            entry.api_errors.clear();
        }
        self.form_errors.lock().unwrap().clear();
    }

    /// Writes normalized processor error codes back onto the form.
    ///
    /// Codes that belong to a mounted field land on that field; everything
    /// else (including codes for unmounted fields) lands on the form.
    pub fn apply_api_errors(&self, codes: &[ApiErrorCode]) {
        for &code in codes {
            let applied = code.field().is_some_and(|field| {
                match self.fields.get_mut(&field) {
                    Some(mut state) => {
                        state.api_errors.push(code);
                        true
                    }
                    None => false,
                }
            });
            if !applied {
                self.form_errors.lock().unwrap().push(code);
            }
        }
    }

    /// Processor error codes currently on a field.
    pub fn field_api_errors(&self, kind: FieldKind) -> Vec<ApiErrorCode> {
        self.fields
            .get(&kind)
            .map(|state| state.api_errors.clone())
            .unwrap_or_default()
    }

    /// Processor error codes that apply to the submission as a whole.
    pub fn form_api_errors(&self) -> Vec<ApiErrorCode> {
        self.form_errors.lock().unwrap().clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Card Extraction
    // ─────────────────────────────────────────────────────────────────────────

    /// Validates every mounted field and builds the card for submission.
    ///
    /// All failing fields are reported together, in display order. Name and
    /// postal only participate when mounted; an empty postal value fails
    /// only under the `require_postal_code` flag.
    pub fn extract_card(&self, flags: FeatureFlags) -> Result<Card, Vec<FieldError>> {
        let now = Utc::now();
        let eligible = self.eligible_vendors();
        let mut errors = Vec::new();

        let number = self.value(FieldKind::Number).unwrap_or_default();
        let brand = match validate::validate_number(&number, eligible.as_ref()) {
            Ok(brand) => Some(brand),
            Err(code) => {
                errors.push(FieldError {
                    field: FieldKind::Number,
                    code,
                });
                None
            }
        };

        let expiry_value = self.value(FieldKind::Expiry).unwrap_or_default();
        let expiry = match validate::validate_expiry(&expiry_value, now) {
            Ok(expiry) => Some(expiry),
            Err(code) => {
                errors.push(FieldError {
                    field: FieldKind::Expiry,
                    code,
                });
                None
            }
        };

        let cvv = self.value(FieldKind::Cvv).unwrap_or_default();
        if let Err(code) = validate::validate_cvv(&cvv, brand) {
            errors.push(FieldError {
                field: FieldKind::Cvv,
                code,
            });
        }

        let name = self.value(FieldKind::Name);
        if let Some(value) = &name {
            if let Err(code) = validate::validate_name(value) {
                errors.push(FieldError {
                    field: FieldKind::Name,
                    code,
                });
            }
        }

        let postal = self.value(FieldKind::Postal);
        if let Some(value) = &postal {
            if let Err(code) = validate::validate_postal(value, flags.require_postal_code) {
                errors.push(FieldError {
                    field: FieldKind::Postal,
                    code,
                });
            }
        }

        let Some(expiry) = expiry else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Card {
            number,
            expiry,
            cvv,
            name: name.filter(|value| !value.trim().is_empty()),
            postal_code: postal
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardfields_types::CardError;

    /// Mounts number, expiry and cvv with a valid Visa test card.
    fn mounted_form() -> FormRegistry {
        let registry = FormRegistry::new();
        registry.mount(FieldKind::Number);
        registry.mount(FieldKind::Expiry);
        registry.mount(FieldKind::Cvv);
        registry.set_value(FieldKind::Number, "4111 1111 1111 1111");
        registry.set_value(FieldKind::Expiry, "11/99");
        registry.set_value(FieldKind::Cvv, "123");
        registry
    }

    #[test]
    fn test_has_card_fields_requires_number_expiry_cvv() {
        let registry = FormRegistry::new();
        assert!(!registry.has_card_fields());

        registry.mount(FieldKind::Number);
        registry.mount(FieldKind::Expiry);
        assert!(!registry.has_card_fields());

        registry.mount(FieldKind::Cvv);
        assert!(registry.has_card_fields());

        // Optional fields do not change the answer
        registry.unmount(FieldKind::Cvv);
        registry.mount(FieldKind::Name);
        registry.mount(FieldKind::Postal);
        assert!(!registry.has_card_fields());
    }

    #[test]
    fn test_set_value_requires_mounted_field() {
        let registry = FormRegistry::new();
        assert!(!registry.set_value(FieldKind::Number, "4111"));
        registry.mount(FieldKind::Number);
        assert!(registry.set_value(FieldKind::Number, "4111"));
        assert_eq!(registry.value(FieldKind::Number).as_deref(), Some("4111"));
    }

    #[test]
    fn test_unmount_drops_state() {
        let registry = mounted_form();
        registry.unmount(FieldKind::Number);
        assert!(registry.value(FieldKind::Number).is_none());
        assert!(!registry.has_card_fields());
    }

    #[test]
    fn test_mounted_in_display_order() {
        let registry = FormRegistry::new();
        registry.mount(FieldKind::Postal);
        registry.mount(FieldKind::Number);
        registry.mount(FieldKind::Cvv);
        assert_eq!(
            registry.mounted(),
            vec![FieldKind::Number, FieldKind::Cvv, FieldKind::Postal]
        );
    }

    #[test]
    fn test_extract_card_success() {
        let registry = mounted_form();
        let card = registry.extract_card(FeatureFlags::default()).unwrap();
        assert_eq!(card.last_four(), "1111");
        assert_eq!(card.expiry.month(), 11);
        assert!(card.name.is_none());
        assert!(card.postal_code.is_none());
    }

    #[test]
    fn test_extract_card_reports_all_failures_together() {
        let registry = mounted_form();
        registry.set_value(FieldKind::Number, "4111111111111112");
        registry.set_value(FieldKind::Expiry, "01/20");
        registry.set_value(FieldKind::Cvv, "12");
        let errors = registry.extract_card(FeatureFlags::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError {
                    field: FieldKind::Number,
                    code: CardError::InvalidNumber,
                },
                FieldError {
                    field: FieldKind::Expiry,
                    code: CardError::InvalidExpiry,
                },
                FieldError {
                    field: FieldKind::Cvv,
                    code: CardError::InvalidCvv,
                },
            ]
        );
    }

    #[test]
    fn test_extract_card_rejects_non_ascii_expiry() {
        let registry = mounted_form();
        registry.set_value(FieldKind::Expiry, "💳");
        let errors = registry.extract_card(FeatureFlags::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError {
                field: FieldKind::Expiry,
                code: CardError::InvalidExpiry,
            }]
        );
    }

    #[test]
    fn test_extract_card_ineligible_vendor() {
        let registry = mounted_form();
        registry.set_eligible_vendors([CardVendor::Mastercard]);
        let errors = registry.extract_card(FeatureFlags::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, CardError::IneligibleCardVendor);

        registry.clear_eligible_vendors();
        assert!(registry.extract_card(FeatureFlags::default()).is_ok());
    }

    #[test]
    fn test_extract_card_empty_name_is_fine() {
        let registry = mounted_form();
        registry.mount(FieldKind::Name);
        let card = registry.extract_card(FeatureFlags::default()).unwrap();
        assert!(card.name.is_none());

        registry.set_value(FieldKind::Name, "Ada Lovelace");
        let card = registry.extract_card(FeatureFlags::default()).unwrap();
        assert_eq!(card.name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_extract_card_postal_required_by_flag() {
        let registry = mounted_form();
        registry.mount(FieldKind::Postal);

        // Optional by default
        assert!(registry.extract_card(FeatureFlags::default()).is_ok());

        let flags = FeatureFlags {
            require_postal_code: true,
            ..FeatureFlags::default()
        };
        let errors = registry.extract_card(flags).unwrap_err();
        assert_eq!(errors[0].code, CardError::InvalidPostal);

        registry.set_value(FieldKind::Postal, "95131");
        let card = registry.extract_card(flags).unwrap();
        assert_eq!(card.postal_code.as_deref(), Some("95131"));
    }

    #[test]
    fn test_extract_card_amex_cid() {
        let registry = mounted_form();
        registry.set_value(FieldKind::Number, "378282246310005");
        registry.set_value(FieldKind::Cvv, "123");
        let errors = registry.extract_card(FeatureFlags::default()).unwrap_err();
        assert_eq!(errors[0].code, CardError::InvalidCvv);

        registry.set_value(FieldKind::Cvv, "1234");
        assert!(registry.extract_card(FeatureFlags::default()).is_ok());
    }

    #[test]
    fn test_api_errors_land_on_fields_and_form() {
        let registry = mounted_form();
        registry.apply_api_errors(&[
            ApiErrorCode::InvalidNumber,
            ApiErrorCode::CardExpired,
            ApiErrorCode::TransactionRejected,
        ]);
        assert_eq!(
            registry.field_api_errors(FieldKind::Number),
            vec![ApiErrorCode::InvalidNumber]
        );
        assert_eq!(
            registry.field_api_errors(FieldKind::Expiry),
            vec![ApiErrorCode::CardExpired]
        );
        assert_eq!(
            registry.form_api_errors(),
            vec![ApiErrorCode::TransactionRejected]
        );
    }

    #[test]
    fn test_api_error_for_unmounted_field_falls_back_to_form() {
        let registry = FormRegistry::new();
        registry.mount(FieldKind::Number);
        registry.apply_api_errors(&[ApiErrorCode::CardExpired]);
        assert_eq!(registry.form_api_errors(), vec![ApiErrorCode::CardExpired]);
    }

    #[test]
    fn test_clear_api_errors() {
        let registry = mounted_form();
        registry.apply_api_errors(&[
            ApiErrorCode::InvalidSecurityCode,
            ApiErrorCode::TransactionRejected,
        ]);
        registry.clear_api_errors();
        assert!(registry.field_api_errors(FieldKind::Cvv).is_empty());
        assert!(registry.form_api_errors().is_empty());
    }
}
