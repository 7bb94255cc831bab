//! Submission dispatcher: one entry point, two flows.
//!
//! `submit` validates the mounted form, shapes the payment source and
//! hands it to the flow the props selected. The purchase flow creates an
//! order through the integrator and confirms it; the vault flow creates a
//! setup token and attaches the card to it.
//!
//! Failure handling depends on where a failure happens. An unsubmittable
//! or invalid form is returned straight to the caller. Once a flow is
//! running, a failure is recorded, written back onto the fields when the
//! processor named them, reported through `on_error`, and then returned.

use std::sync::Arc;

use tracing::instrument;

use cardfields_types::{
    Approval, CardProps, CreateOrder, CreateVaultSetupToken, ExtraFields, FacilitatorAuth,
    FeatureFlags, FlowProps, GatewayError, OrderId, PaymentSource, ProcessorGateway, SessionId,
    SubmitError, VaultAuth, VaultSetupToken,
};

use crate::registry::FormRegistry;
use crate::telemetry::Telemetry;

/// Per-submission options supplied by the embedding layer.
#[derive(Clone)]
pub struct SubmitOptions {
    /// OAuth token of the facilitating partner, used to confirm orders
    pub facilitator_access_token: String,
    /// Attribution id forwarded on confirms, empty when unattributed
    pub partner_attribution_id: String,
    /// Feature switches for this submission
    pub feature_flags: FeatureFlags,
    /// Payment source fields collected outside the card form
    pub extra_fields: Option<ExtraFields>,
}

impl SubmitOptions {
    /// Creates options with default flags, no attribution, and no extra
    /// fields.
    pub fn new(facilitator_access_token: impl Into<String>) -> Self {
        Self {
            facilitator_access_token: facilitator_access_token.into(),
            partner_attribution_id: String::new(),
            feature_flags: FeatureFlags::default(),
            extra_fields: None,
        }
    }
}

impl std::fmt::Debug for SubmitOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitOptions")
            .field("facilitator_access_token", &"<redacted>")
            .field("partner_attribution_id", &self.partner_attribution_id)
            .field("feature_flags", &self.feature_flags)
            .field("extra_fields", &self.extra_fields)
            .finish()
    }
}

/// Card fields session service, generic over the processor gateway.
pub struct CardFieldsService<G: ProcessorGateway> {
    gateway: G,
    registry: Arc<FormRegistry>,
    props: CardProps,
    session_id: SessionId,
}

impl<G: ProcessorGateway> CardFieldsService<G> {
    /// Creates a session over a mounted form.
    pub fn new(gateway: G, registry: Arc<FormRegistry>, props: CardProps) -> Self {
        Self {
            gateway,
            registry,
            props,
            session_id: SessionId::new(),
        }
    }

    /// The form this session submits.
    pub fn registry(&self) -> &Arc<FormRegistry> {
        &self.registry
    }

    /// The session's configuration.
    pub fn props(&self) -> &CardProps {
        &self.props
    }

    /// This session's id.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Submits the mounted card fields on the configured flow.
    ///
    /// Processor errors from the previous attempt are cleared first, so a
    /// resubmit always starts from a clean form.
    #[instrument(
        skip(self, options),
        fields(session_id = %self.session_id, flow = self.props.flow().name())
    )]
    pub async fn submit(&self, options: SubmitOptions) -> Result<Approval, SubmitError> {
        self.registry.clear_api_errors();

        if !self.registry.has_card_fields() {
            return self.report_error(SubmitError::UnableToSubmit).await;
        }
        let card = match self.registry.extract_card(options.feature_flags) {
            Ok(card) => card,
            Err(errors) => {
                return self.report_error(SubmitError::InvalidCard { errors }).await;
            }
        };

        let payment_source = PaymentSource::from_card(&card, options.extra_fields.as_ref());
        let telemetry = Telemetry::new(self.session_id);

        match self.props.flow() {
            FlowProps::Purchase(create_order) => {
                let mut seen_order = None;
                match self
                    .purchase(
                        create_order.as_ref(),
                        &payment_source,
                        &options,
                        &mut seen_order,
                    )
                    .await
                {
                    Ok(order_id) => {
                        telemetry.purchase_success(&order_id);
                        Ok(Approval::Purchase { order_id })
                    }
                    Err(error) => {
                        telemetry.purchase_failure(&error, seen_order.as_ref());
                        self.report_error(error).await
                    }
                }
            }
            FlowProps::Vault(create_vault_setup_token) => {
                let mut seen_token = None;
                match self
                    .vault(
                        create_vault_setup_token.as_ref(),
                        &payment_source,
                        &mut seen_token,
                    )
                    .await
                {
                    Ok(setup_token) => {
                        telemetry.vault_success(&setup_token);
                        Ok(Approval::Vault {
                            vault_setup_token: setup_token,
                        })
                    }
                    Err(error) => {
                        telemetry.vault_failure(&error, seen_token.as_ref());
                        self.report_error(error).await
                    }
                }
            }
        }
    }

    /// Create an order through the integrator, confirm it, then approve.
    async fn purchase(
        &self,
        create_order: &dyn CreateOrder,
        payment_source: &PaymentSource,
        options: &SubmitOptions,
        seen_order: &mut Option<OrderId>,
    ) -> Result<OrderId, SubmitError> {
        let raw = create_order.create_order().await?;
        let order_id: OrderId = raw.parse().map_err(|_| SubmitError::OrderIdType)?;
        *seen_order = Some(order_id.clone());

        let auth = FacilitatorAuth {
            access_token: options.facilitator_access_token.clone(),
            partner_attribution_id: options.partner_attribution_id.clone(),
        };
        self.gateway
            .confirm_order(&order_id, payment_source, &auth)
            .await
            .map_err(|error| self.mark_fields(error))?;

        if let Some(on_approve) = self.props.on_approve() {
            on_approve
                .on_approve(Approval::Purchase {
                    order_id: order_id.clone(),
                })
                .await?;
        }
        Ok(order_id)
    }

    /// Create a setup token through the integrator, attach the card, then
    /// approve.
    async fn vault(
        &self,
        create_vault_setup_token: &dyn CreateVaultSetupToken,
        payment_source: &PaymentSource,
        seen_token: &mut Option<VaultSetupToken>,
    ) -> Result<VaultSetupToken, SubmitError> {
        let raw = create_vault_setup_token.create_vault_setup_token().await?;
        let setup_token: VaultSetupToken = raw.parse().map_err(|_| SubmitError::VaultTokenType)?;
        *seen_token = Some(setup_token.clone());

        let auth = VaultAuth {
            client_id: self.props.client_id().to_string(),
            id_token: self.props.user_id_token().map(String::from),
        };
        self.gateway
            .update_vault_setup_token(&setup_token, payment_source, &auth)
            .await
            .map_err(|error| self.mark_fields(error))?;

        if let Some(on_approve) = self.props.on_approve() {
            on_approve
                .on_approve(Approval::Vault {
                    vault_setup_token: setup_token.clone(),
                })
                .await?;
        }
        Ok(setup_token)
    }

    /// Writes processor field errors back onto the form.
    fn mark_fields(&self, error: GatewayError) -> SubmitError {
        self.registry.apply_api_errors(&error.api_error_codes());
        SubmitError::Gateway(error)
    }

    /// Reports a failure through `on_error`, then hands it back.
    ///
    /// Pre-flow failures never reach `on_error`; the hook only sees errors
    /// raised inside a flow.
    async fn report_error(&self, error: SubmitError) -> Result<Approval, SubmitError> {
        if error.is_pre_flow() {
            return Err(error);
        }
        if let Some(on_error) = self.props.on_error() {
            on_error.on_error(error.clone()).await;
        }
        Err(error)
    }
}
