//! Error types for the card fields SDK.

use serde::{Deserialize, Serialize};

use crate::domain::FieldKind;

/// Configuration errors raised when finalizing card props.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PropsError {
    #[error("Cannot pass both create_vault_setup_token and create_order")]
    BothCreationCallbacks,

    #[error("Must pass either create_vault_setup_token or create_order")]
    MissingCreationCallback,

    #[error("on_approve is required when saving card fields")]
    MissingOnApprove,

    #[error("create_vault_setup_token is required when saving card fields")]
    MissingCreateVaultSetupToken,
}

/// Client-side validation failure codes.
///
/// Serialized and displayed as the upper snake codes integrators match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardError {
    #[error("INELIGIBLE_CARD_VENDOR")]
    IneligibleCardVendor,

    #[error("INVALID_NUMBER")]
    InvalidNumber,

    #[error("INVALID_EXPIRY")]
    InvalidExpiry,

    #[error("INVALID_CVV")]
    InvalidCvv,

    #[error("INVALID_NAME")]
    InvalidName,

    #[error("INVALID_POSTAL")]
    InvalidPostal,
}

/// One card field that failed client-side validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The field that failed
    pub field: FieldKind,
    /// Why it failed
    pub code: CardError,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.code)
    }
}

/// Processor field-error codes, normalized from the order API's error
/// envelope and applied back onto the mounted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    InvalidNumber,
    MissingNumber,
    InvalidExpirationDateFormat,
    InvalidExpirationDateLength,
    CardExpired,
    MissingExpirationDate,
    InvalidSecurityCode,
    TransactionRejected,
}

impl ApiErrorCode {
    /// Normalizes a `(field path, issue)` pair from the error envelope's
    /// `details` array. Unrecognized pairs map to nothing.
    pub fn from_field_issue(field: &str, issue: &str) -> Option<Self> {
        match (field, issue) {
            ("/payment_source/card/number", "VALIDATION_ERROR") => Some(Self::InvalidNumber),
            ("/payment_source/card/number", "MISSING_REQUIRED_PARAMETER") => {
                Some(Self::MissingNumber)
            }
            ("/payment_source/card/expiry", "INVALID_PARAMETER_SYNTAX") => {
                Some(Self::InvalidExpirationDateFormat)
            }
            ("/payment_source/card/expiry", "INVALID_STRING_LENGTH") => {
                Some(Self::InvalidExpirationDateLength)
            }
            ("/payment_source/card/expiry", "CARD_EXPIRED") => Some(Self::CardExpired),
            ("/payment_source/card/expiry", "MISSING_REQUIRED_PARAMETER") => {
                Some(Self::MissingExpirationDate)
            }
            ("/payment_source/card/security_code", "VALIDATION_ERROR") => {
                Some(Self::InvalidSecurityCode)
            }
            _ => None,
        }
    }

    /// Normalizes a top-level error name from the envelope.
    pub fn from_error_name(name: &str) -> Option<Self> {
        match name {
            "TRANSACTION_REFUSED" => Some(Self::TransactionRejected),
            _ => None,
        }
    }

    /// The mounted field this code belongs to. `None` for codes that apply
    /// to the submission as a whole.
    pub fn field(&self) -> Option<FieldKind> {
        match self {
            Self::InvalidNumber | Self::MissingNumber => Some(FieldKind::Number),
            Self::InvalidExpirationDateFormat
            | Self::InvalidExpirationDateLength
            | Self::CardExpired
            | Self::MissingExpirationDate => Some(FieldKind::Expiry),
            Self::InvalidSecurityCode => Some(FieldKind::Cvv),
            Self::TransactionRejected => None,
        }
    }
}

impl std::fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber => write!(f, "INVALID_NUMBER"),
            Self::MissingNumber => write!(f, "MISSING_NUMBER"),
            Self::InvalidExpirationDateFormat => write!(f, "INVALID_EXPIRATION_DATE_FORMAT"),
            Self::InvalidExpirationDateLength => write!(f, "INVALID_EXPIRATION_DATE_LENGTH"),
            Self::CardExpired => write!(f, "CARD_EXPIRED"),
            Self::MissingExpirationDate => write!(f, "MISSING_EXPIRATION_DATE"),
            Self::InvalidSecurityCode => write!(f, "INVALID_SECURITY_CODE"),
            Self::TransactionRejected => write!(f, "TRANSACTION_REJECTED"),
        }
    }
}

/// Error raised by an integrator callback.
///
/// Integrations frequently reject with a bare message rather than a typed
/// error, so plain strings convert directly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    /// Creates a callback error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// One entry of the processor error envelope's `details` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// JSON pointer to the offending request field
    #[serde(default)]
    pub field: String,
    /// Issue code for that field
    #[serde(default)]
    pub issue: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Failures from the processor gateway.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{name}: {message}")]
    Api {
        status: u16,
        name: String,
        message: String,
        details: Vec<FieldIssue>,
    },

    #[error("Could not decode processor response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Normalized field-level codes carried by this error, in envelope
    /// order, with the top-level name mapped last.
    pub fn api_error_codes(&self) -> Vec<ApiErrorCode> {
        let GatewayError::Api { name, details, .. } = self else {
            return Vec::new();
        };
        let mut codes: Vec<ApiErrorCode> = details
            .iter()
            .filter_map(|issue| ApiErrorCode::from_field_issue(&issue.field, &issue.issue))
            .collect();
        if let Some(code) = ApiErrorCode::from_error_name(name) {
            codes.push(code);
        }
        codes
    }
}

fn summarize_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Submission failures surfaced to the integrator.
///
/// `UnableToSubmit` and `InvalidCard` are raised before a flow is entered;
/// the rest carry failures from inside a flow, after the creation callback
/// has run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmitError {
    #[error("Card fields not available to submit")]
    UnableToSubmit,

    #[error("Expected create_order to resolve with the order id as a string")]
    OrderIdType,

    #[error("Expected create_vault_setup_token to resolve with the vault setup token as a string")]
    VaultTokenType,

    #[error("Card fields failed validation: {}", summarize_field_errors(.errors))]
    InvalidCard { errors: Vec<FieldError> },

    #[error(transparent)]
    Callback(#[from] CallbackError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl SubmitError {
    /// Whether this failure happened before the flow callbacks ran.
    ///
    /// Pre-flow failures are returned to the caller without invoking
    /// `on_error`.
    pub fn is_pre_flow(&self) -> bool {
        matches!(
            self,
            SubmitError::UnableToSubmit | SubmitError::InvalidCard { .. }
        )
    }
}
