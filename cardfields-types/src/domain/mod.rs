//! Domain models for the card fields SDK.

pub mod card;
pub mod ids;
pub mod payment_source;

pub use card::{Card, Expiry, ExpiryError, FieldKind};
pub use ids::{InvalidProcessorId, OrderId, SessionId, VaultSetupToken};
pub use payment_source::{BillingAddress, CardPaymentSource, ExtraFields, PaymentSource};
