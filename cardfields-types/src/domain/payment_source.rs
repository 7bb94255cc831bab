//! Payment source wire shapes sent to the processor.

use serde::{Deserialize, Serialize};

use super::card::Card;

/// Billing address in the processor's wire shape.
///
/// All parts are optional; a postal-only address is common when just the
/// postal field is mounted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAddress {
    /// First street line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line_1: Option<String>,
    /// Second street line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line_2: Option<String>,
    /// State, province or region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_area_1: Option<String>,
    /// City or town
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_area_2: Option<String>,
    /// Postal or zip code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Two-letter country code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl BillingAddress {
    /// An address carrying only a postal code.
    pub fn from_postal_code(postal_code: impl Into<String>) -> Self {
        Self {
            postal_code: Some(postal_code.into()),
            ..Self::default()
        }
    }
}

/// Additional fields an integrator may pass at submit time.
///
/// Unknown keys are rejected rather than silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtraFields {
    /// Full billing address; overrides the postal field value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<BillingAddress>,
}

/// Card details in the processor's wire shape.
///
/// Number and security code never appear in debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPaymentSource {
    /// Card number, digits only
    pub number: String,
    /// Expiration in `YYYY-MM` form
    pub expiry: String,
    /// Security code
    pub security_code: String,
    /// Cardholder name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Billing address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<BillingAddress>,
}

impl std::fmt::Debug for CardPaymentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardPaymentSource")
            .field("number", &"<redacted>")
            .field("expiry", &self.expiry)
            .field("security_code", &"<redacted>")
            .field("name", &self.name)
            .field("billing_address", &self.billing_address)
            .finish()
    }
}

/// The `payment_source` object attached to orders and setup tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSource {
    /// The card payment source
    pub card: CardPaymentSource,
}

impl PaymentSource {
    /// Shapes validated card values for the processor's API.
    ///
    /// A billing address supplied through `extra` wins over the mounted
    /// postal field; otherwise the postal value becomes a postal-only
    /// address.
    pub fn from_card(card: &Card, extra: Option<&ExtraFields>) -> Self {
        let billing_address = extra
            .and_then(|extra| extra.billing_address.clone())
            .or_else(|| {
                card.postal_code
                    .as_deref()
                    .map(BillingAddress::from_postal_code)
            });
        Self {
            card: CardPaymentSource {
                number: card_brands::normalize(&card.number),
                expiry: card.expiry.to_wire(),
                security_code: card.cvv.clone(),
                name: card.name.clone(),
                billing_address,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_card() -> Card {
        Card {
            number: "4111 1111 1111 1111".to_string(),
            expiry: "11/27".parse().unwrap(),
            cvv: "123".to_string(),
            name: Some("J Doe".to_string()),
            postal_code: Some("95131".to_string()),
        }
    }

    #[test]
    fn test_payment_source_wire_shape() {
        let source = PaymentSource::from_card(&sample_card(), None);
        assert_eq!(
            serde_json::to_value(&source).unwrap(),
            json!({
                "card": {
                    "number": "4111111111111111",
                    "expiry": "2027-11",
                    "security_code": "123",
                    "name": "J Doe",
                    "billing_address": { "postal_code": "95131" },
                }
            })
        );
    }

    #[test]
    fn test_absent_parts_are_omitted() {
        let mut card = sample_card();
        card.name = None;
        card.postal_code = None;
        let value = serde_json::to_value(PaymentSource::from_card(&card, None)).unwrap();
        assert!(value["card"].get("name").is_none());
        assert!(value["card"].get("billing_address").is_none());
    }

    #[test]
    fn test_extra_billing_address_wins_over_postal_field() {
        let extra = ExtraFields {
            billing_address: Some(BillingAddress {
                postal_code: Some("10001".to_string()),
                country_code: Some("US".to_string()),
                ..BillingAddress::default()
            }),
        };
        let source = PaymentSource::from_card(&sample_card(), Some(&extra));
        let address = source.card.billing_address.unwrap();
        assert_eq!(address.postal_code.as_deref(), Some("10001"));
        assert_eq!(address.country_code.as_deref(), Some("US"));
    }

    #[test]
    fn test_extra_fields_reject_unknown_keys() {
        let result: Result<ExtraFields, _> =
            serde_json::from_value(json!({ "shipping_address": {} }));
        assert!(result.is_err());
    }

    #[test]
    fn test_payment_source_debug_redacts_pan() {
        let source = PaymentSource::from_card(&sample_card(), None);
        let debug = format!("{source:?}");
        assert!(!debug.contains("4111"));
        assert!(!debug.contains("123"));
    }
}
