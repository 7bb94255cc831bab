//! # Card Fields API
//!
//! A typed REST adapter for the processor's order and vault APIs,
//! implementing the gateway port.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cardfields_types::{
    FacilitatorAuth, FieldIssue, GatewayError, OrderId, PaymentSource, ProcessorGateway, VaultAuth,
    VaultSetupToken,
};

/// Body of a confirm-payment-source call.
#[derive(Serialize)]
struct ConfirmOrderBody<'a> {
    payment_source: &'a PaymentSource,
}

/// Body of a setup-token update.
#[derive(Serialize)]
struct UpdateSetupTokenBody<'a> {
    payment_source: &'a PaymentSource,
}

/// The processor's error envelope. `name` and `message` are required so
/// that unrelated JSON bodies fall through to the raw-message fallback.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    name: String,
    message: String,
    #[serde(default)]
    details: Vec<FieldIssue>,
}

/// Processor API client.
pub struct ProcessorClient {
    base_url: String,
    http: Client,
}

impl ProcessorClient {
    /// Creates a new client against a processor base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn confirm_url(&self, order_id: &OrderId) -> String {
        format!(
            "{}/v2/checkout/orders/{}/confirm-payment-source",
            self.base_url, order_id
        )
    }

    fn setup_token_url(&self, setup_token: &VaultSetupToken) -> String {
        format!("{}/v3/vault/setup-tokens/{}", self.base_url, setup_token)
    }

    /// Maps a non-2xx response to a gateway error carrying the envelope's
    /// field details.
    async fn handle_response(resp: reqwest::Response) -> Result<(), GatewayError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Err(Self::decode_error(status, body))
    }

    /// Decodes the error envelope out of a failure body, keeping the raw
    /// body under the status's canonical reason when it is anything else.
    fn decode_error(status: reqwest::StatusCode, body: String) -> GatewayError {
        let envelope = serde_json::from_str::<ErrorEnvelope>(&body).unwrap_or_else(|_| {
            ErrorEnvelope {
                name: status
                    .canonical_reason()
                    .unwrap_or("UNKNOWN_ERROR")
                    .to_string(),
                message: body,
                details: Vec::new(),
            }
        });
        GatewayError::Api {
            status: status.as_u16(),
            name: envelope.name,
            message: envelope.message,
            details: envelope.details,
        }
    }
}

#[async_trait]
impl ProcessorGateway for ProcessorClient {
    async fn confirm_order(
        &self,
        order_id: &OrderId,
        payment_source: &PaymentSource,
        auth: &FacilitatorAuth,
    ) -> Result<(), GatewayError> {
        let mut req = self
            .http
            .post(self.confirm_url(order_id))
            .bearer_auth(&auth.access_token)
            .header("X-Request-Id", Uuid::new_v4().to_string())
            .json(&ConfirmOrderBody { payment_source });
        if !auth.partner_attribution_id.is_empty() {
            req = req.header("Partner-Attribution-Id", &auth.partner_attribution_id);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Self::handle_response(resp).await
    }

    async fn update_vault_setup_token(
        &self,
        setup_token: &VaultSetupToken,
        payment_source: &PaymentSource,
        auth: &VaultAuth,
    ) -> Result<(), GatewayError> {
        let mut req = self
            .http
            .post(self.setup_token_url(setup_token))
            .header("X-Client-Id", &auth.client_id)
            .header("X-Request-Id", Uuid::new_v4().to_string())
            .json(&UpdateSetupTokenBody { payment_source });
        if let Some(id_token) = &auth.id_token {
            req = req.bearer_auth(id_token);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Self::handle_response(resp).await
    }
}
