//! Processor gateway port trait.
//!
//! This is the outbound port in our hexagonal architecture.
//! Adapters (REST client, test doubles) implement this trait.

use crate::domain::{OrderId, PaymentSource, VaultSetupToken};
use crate::error::GatewayError;

/// Authentication material for order confirmation.
///
/// The access token never appears in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct FacilitatorAuth {
    /// OAuth access token of the facilitating partner
    pub access_token: String,
    /// Attribution id forwarded to the processor, empty when unattributed
    pub partner_attribution_id: String,
}

impl FacilitatorAuth {
    /// Creates auth material with no partner attribution.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            partner_attribution_id: String::new(),
        }
    }
}

impl std::fmt::Debug for FacilitatorAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilitatorAuth")
            .field("access_token", &"<redacted>")
            .field("partner_attribution_id", &self.partner_attribution_id)
            .finish()
    }
}

/// Client context for vault setup-token updates.
///
/// The id token never appears in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct VaultAuth {
    /// Client id of the integrator
    pub client_id: String,
    /// Buyer id token, when the integration supplies one
    pub id_token: Option<String>,
}

impl VaultAuth {
    /// Creates vault auth for a client, without a buyer id token.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            id_token: None,
        }
    }
}

impl std::fmt::Debug for VaultAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultAuth")
            .field("client_id", &self.client_id)
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Outbound port to the processor's order and vault APIs.
#[async_trait::async_trait]
pub trait ProcessorGateway: Send + Sync + 'static {
    /// Attaches the payment source to an existing order and confirms it.
    async fn confirm_order(
        &self,
        order_id: &OrderId,
        payment_source: &PaymentSource,
        auth: &FacilitatorAuth,
    ) -> Result<(), GatewayError>;

    /// Attaches the payment source to an existing vault setup token.
    async fn update_vault_setup_token(
        &self,
        setup_token: &VaultSetupToken,
        payment_source: &PaymentSource,
        auth: &VaultAuth,
    ) -> Result<(), GatewayError>;
}

/// A shared handle to a gateway is itself a gateway.
#[async_trait::async_trait]
impl<G: ProcessorGateway> ProcessorGateway for std::sync::Arc<G> {
    async fn confirm_order(
        &self,
        order_id: &OrderId,
        payment_source: &PaymentSource,
        auth: &FacilitatorAuth,
    ) -> Result<(), GatewayError> {
        (**self).confirm_order(order_id, payment_source, auth).await
    }

    async fn update_vault_setup_token(
        &self,
        setup_token: &VaultSetupToken,
        payment_source: &PaymentSource,
        auth: &VaultAuth,
    ) -> Result<(), GatewayError> {
        (**self)
            .update_vault_setup_token(setup_token, payment_source, auth)
            .await
    }
}
