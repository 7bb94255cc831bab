//! # Card Fields Core
//!
//! Field registry, client-side validation and the submission service for
//! the hosted card fields SDK.
//!
//! ## Architecture
//!
//! - `registry/` - Mounted-field state shared with the embedding layer
//! - `validate/` - Per-field validation against the brand tables
//! - `styles/` - Integrator style sanitization and CSS rendering
//! - `service/` - Submission dispatcher (purchase flow / vault flow)
//! - `telemetry/` - Success/failure records keyed by order or vault token
//!
//! The service is generic over `G: ProcessorGateway`, allowing
//! different gateway implementations to be injected.

pub mod registry;
pub mod service;
pub mod styles;
pub mod telemetry;
pub mod validate;

#[cfg(test)]
mod service_tests;

pub use registry::FormRegistry;
pub use service::{CardFieldsService, SubmitOptions};
pub use telemetry::Telemetry;
