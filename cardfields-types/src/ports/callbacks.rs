//! Integrator callback port traits.
//!
//! These are the inbound contract of the SDK: the integrator supplies a
//! creation callback for its flow plus approval and error hooks. Each trait
//! has a blanket impl for async closures so tests and simple integrations
//! can pass plain `async` functions.

use std::future::Future;

use crate::domain::{OrderId, VaultSetupToken};
use crate::error::{CallbackError, SubmitError};

/// Payload delivered to `on_approve` when a submission completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval {
    /// Purchase flow: the order the card was attached to
    Purchase { order_id: OrderId },
    /// Vault flow: the setup token the card was attached to
    Vault { vault_setup_token: VaultSetupToken },
}

/// Creates an order on the integrator's server.
///
/// Resolves with the order id. Selecting this callback puts the submission
/// on the purchase flow.
#[async_trait::async_trait]
pub trait CreateOrder: Send + Sync {
    async fn create_order(&self) -> Result<String, CallbackError>;
}

#[async_trait::async_trait]
impl<F, Fut> CreateOrder for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, CallbackError>> + Send + 'static,
{
    async fn create_order(&self) -> Result<String, CallbackError> {
        self().await
    }
}

/// Creates a vault setup token on the integrator's server.
///
/// Resolves with the setup token. Selecting this callback puts the
/// submission on the vault flow.
#[async_trait::async_trait]
pub trait CreateVaultSetupToken: Send + Sync {
    async fn create_vault_setup_token(&self) -> Result<String, CallbackError>;
}

#[async_trait::async_trait]
impl<F, Fut> CreateVaultSetupToken for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, CallbackError>> + Send + 'static,
{
    async fn create_vault_setup_token(&self) -> Result<String, CallbackError> {
        self().await
    }
}

/// Invoked once when a submission completes successfully.
#[async_trait::async_trait]
pub trait OnApprove: Send + Sync {
    async fn on_approve(&self, approval: Approval) -> Result<(), CallbackError>;
}

#[async_trait::async_trait]
impl<F, Fut> OnApprove for F
where
    F: Fn(Approval) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), CallbackError>> + Send + 'static,
{
    async fn on_approve(&self, approval: Approval) -> Result<(), CallbackError> {
        self(approval).await
    }
}

/// Invoked when a flow fails, before the error is returned to the caller.
#[async_trait::async_trait]
pub trait OnError: Send + Sync {
    async fn on_error(&self, error: SubmitError);
}

#[async_trait::async_trait]
impl<F, Fut> OnError for F
where
    F: Fn(SubmitError) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_error(&self, error: SubmitError) {
        self(error).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closures_satisfy_callback_ports() {
        let create_order = || async { Ok::<_, CallbackError>("5O190127TN364715T".to_string()) };
        assert_eq!(
            create_order.create_order().await.unwrap(),
            "5O190127TN364715T"
        );

        let failing = || async { Err::<String, _>(CallbackError::new("server down")) };
        let err = CreateVaultSetupToken::create_vault_setup_token(&failing)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "server down");
    }

    #[tokio::test]
    async fn test_on_approve_closure_receives_approval() {
        let on_approve = |approval: Approval| async move {
            match approval {
                Approval::Purchase { order_id } => {
                    assert_eq!(order_id.as_str(), "5O190127TN364715T");
                    Ok(())
                }
                Approval::Vault { .. } => Err(CallbackError::new("wrong flow")),
            }
        };
        let order_id: OrderId = "5O190127TN364715T".parse().unwrap();
        on_approve
            .on_approve(Approval::Purchase { order_id })
            .await
            .unwrap();
    }
}
