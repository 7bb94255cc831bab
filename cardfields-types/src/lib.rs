//! # Card Fields Types
//!
//! Domain types and port traits for the hosted card fields SDK.
//! This crate has ZERO external IO dependencies - only data structures,
//! configuration tables, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Card, Expiry, PaymentSource, ids)
//! - `ports/` - Trait definitions for integrator callbacks and the
//!   processor gateway
//! - `props/` - Caller configuration with flow selection
//! - `constants/` - Styling and placeholder configuration surface
//! - `error/` - The error ladder, from props validation to submit failures

pub mod constants;
pub mod domain;
pub mod error;
pub mod ports;
pub mod props;

// Re-export commonly used types
pub use domain::{
    BillingAddress, Card, CardPaymentSource, Expiry, ExpiryError, ExtraFields, FieldKind,
    InvalidProcessorId, OrderId, PaymentSource, SessionId, VaultSetupToken,
};
pub use error::{
    ApiErrorCode, CallbackError, CardError, FieldError, FieldIssue, GatewayError, PropsError,
    SubmitError,
};
pub use ports::{
    Approval, CreateOrder, CreateVaultSetupToken, FacilitatorAuth, OnApprove, OnError,
    ProcessorGateway, VaultAuth,
};
pub use props::{CardProps, CardPropsBuilder, FeatureFlags, FlowProps, Intent};
