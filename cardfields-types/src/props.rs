//! Caller-supplied configuration for a card fields session.
//!
//! Exactly one of the two creation callbacks may be configured; which one
//! it is selects the submit flow. The builder enforces this at
//! construction, so a finished [`CardProps`] always has a valid flow.

use std::sync::Arc;

use crate::error::PropsError;
use crate::ports::{CreateOrder, CreateVaultSetupToken, OnApprove, OnError};

/// What the integrator intends to do with the captured card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Intent {
    /// Take a payment
    #[default]
    Capture,
    /// Save the card for later use
    Save,
}

/// Feature switches threaded through a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Zero-pad single-digit expiry months in the input mask
    pub zero_padded_expiry: bool,
    /// Treat an empty mounted postal field as a validation failure
    pub require_postal_code: bool,
}

impl FeatureFlags {
    /// The expiry input mask these flags select.
    pub fn expiry_mask(&self) -> &'static str {
        crate::constants::expiry_pattern(self.zero_padded_expiry)
    }
}

/// The creation callback the integrator supplied, which selects the flow.
#[derive(Clone)]
pub enum FlowProps {
    /// Purchase flow: create an order, then confirm it
    Purchase(Arc<dyn CreateOrder>),
    /// Vault flow: create a setup token, then attach the card to it
    Vault(Arc<dyn CreateVaultSetupToken>),
}

impl FlowProps {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            FlowProps::Purchase(_) => "purchase",
            FlowProps::Vault(_) => "vault",
        }
    }
}

impl std::fmt::Debug for FlowProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FlowProps::{}", self.name())
    }
}

/// Validated configuration for a card fields session.
#[derive(Clone)]
pub struct CardProps {
    client_id: String,
    user_id_token: Option<String>,
    intent: Intent,
    flow: FlowProps,
    on_approve: Option<Arc<dyn OnApprove>>,
    on_error: Option<Arc<dyn OnError>>,
}

impl CardProps {
    /// Starts building props for the given client id.
    pub fn builder(client_id: impl Into<String>) -> CardPropsBuilder {
        CardPropsBuilder {
            client_id: client_id.into(),
            user_id_token: None,
            intent: Intent::default(),
            create_order: None,
            create_vault_setup_token: None,
            on_approve: None,
            on_error: None,
        }
    }

    /// Client id of the integrator.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Buyer id token, when the integration supplies one.
    pub fn user_id_token(&self) -> Option<&str> {
        self.user_id_token.as_deref()
    }

    /// Declared intent.
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// The configured flow and its creation callback.
    pub fn flow(&self) -> &FlowProps {
        &self.flow
    }

    /// Whether this session submits on the vault flow.
    pub fn is_vault_flow(&self) -> bool {
        matches!(self.flow, FlowProps::Vault(_))
    }

    /// Approval hook, when configured.
    pub fn on_approve(&self) -> Option<&dyn OnApprove> {
        self.on_approve.as_deref()
    }

    /// Error hook, when configured.
    pub fn on_error(&self) -> Option<&dyn OnError> {
        self.on_error.as_deref()
    }
}

impl std::fmt::Debug for CardProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardProps")
            .field("client_id", &self.client_id)
            .field("user_id_token", &self.user_id_token.as_ref().map(|_| "<redacted>"))
            .field("intent", &self.intent)
            .field("flow", &self.flow)
            .field("on_approve", &self.on_approve.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Builder for [`CardProps`].
pub struct CardPropsBuilder {
    client_id: String,
    user_id_token: Option<String>,
    intent: Intent,
    create_order: Option<Arc<dyn CreateOrder>>,
    create_vault_setup_token: Option<Arc<dyn CreateVaultSetupToken>>,
    on_approve: Option<Arc<dyn OnApprove>>,
    on_error: Option<Arc<dyn OnError>>,
}

impl CardPropsBuilder {
    /// Sets the buyer id token forwarded on vault updates.
    pub fn user_id_token(mut self, token: impl Into<String>) -> Self {
        self.user_id_token = Some(token.into());
        self
    }

    /// Declares the integration intent.
    pub fn intent(mut self, intent: Intent) -> Self {
        self.intent = intent;
        self
    }

    /// Supplies the purchase-flow creation callback.
    pub fn create_order(mut self, callback: impl CreateOrder + 'static) -> Self {
        self.create_order = Some(Arc::new(callback));
        self
    }

    /// Supplies the vault-flow creation callback.
    pub fn create_vault_setup_token(
        mut self,
        callback: impl CreateVaultSetupToken + 'static,
    ) -> Self {
        self.create_vault_setup_token = Some(Arc::new(callback));
        self
    }

    /// Supplies the approval hook.
    pub fn on_approve(mut self, callback: impl OnApprove + 'static) -> Self {
        self.on_approve = Some(Arc::new(callback));
        self
    }

    /// Supplies the error hook.
    pub fn on_error(mut self, callback: impl OnError + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Validates the configuration and finishes the props.
    ///
    /// Exactly one creation callback must be present. Saving requires the
    /// vault callback, and the vault flow requires `on_approve`.
    pub fn build(self) -> Result<CardProps, PropsError> {
        if self.create_order.is_some() && self.create_vault_setup_token.is_some() {
            return Err(PropsError::BothCreationCallbacks);
        }
        if self.intent == Intent::Save && self.create_vault_setup_token.is_none() {
            return Err(PropsError::MissingCreateVaultSetupToken);
        }
        let flow = match (self.create_order, self.create_vault_setup_token) {
            (Some(create_order), None) => FlowProps::Purchase(create_order),
            (None, Some(create_vault_setup_token)) => FlowProps::Vault(create_vault_setup_token),
            _ => return Err(PropsError::MissingCreationCallback),
        };
        if matches!(flow, FlowProps::Vault(_)) && self.on_approve.is_none() {
            return Err(PropsError::MissingOnApprove);
        }
        Ok(CardProps {
            client_id: self.client_id,
            user_id_token: self.user_id_token,
            intent: self.intent,
            flow,
            on_approve: self.on_approve,
            on_error: self.on_error,
        })
    }
}
