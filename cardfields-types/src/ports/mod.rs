//! Port traits connecting the SDK to integrators and the processor.

pub mod callbacks;
pub mod gateway;

pub use callbacks::{Approval, CreateOrder, CreateVaultSetupToken, OnApprove, OnError};
pub use gateway::{FacilitatorAuth, ProcessorGateway, VaultAuth};
