//! Submission outcome records.
//!
//! Every submission attempt gets its own correlation id, tied to the
//! session it ran under. Vault setup tokens are fingerprinted before they
//! reach the logs; raw tokens stay out of telemetry entirely.

use sha2::{Digest, Sha256};
use tracing::{error, info};
use uuid::Uuid;

use cardfields_types::{OrderId, SessionId, SubmitError, VaultSetupToken};

/// Reported fingerprint length, in hex characters.
const FINGERPRINT_LENGTH: usize = 16;

/// Fingerprints a vault setup token for telemetry.
pub fn fingerprint_token(token: &str) -> String {
    let mut fingerprint = hex::encode(Sha256::digest(token.as_bytes()));
    fingerprint.truncate(FINGERPRINT_LENGTH);
    fingerprint
}

/// Correlation context for one submission attempt.
#[derive(Debug, Clone)]
pub struct Telemetry {
    session_id: SessionId,
    correlation_id: Uuid,
}

impl Telemetry {
    /// Starts a new attempt under the given session.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            correlation_id: Uuid::new_v4(),
        }
    }

    /// The attempt's correlation id.
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Records a confirmed purchase.
    pub fn purchase_success(&self, order_id: &OrderId) {
        info!(
            session_id = %self.session_id,
            correlation_id = %self.correlation_id,
            order_id = %order_id,
            "card purchase confirmed",
        );
    }

    /// Records a failed purchase. The order id is present when the failure
    /// happened after order creation.
    pub fn purchase_failure(&self, error: &SubmitError, order_id: Option<&OrderId>) {
        error!(
            session_id = %self.session_id,
            correlation_id = %self.correlation_id,
            order_id = order_id.map(OrderId::as_str),
            "card purchase failed: {error}",
        );
    }

    /// Records a card saved to a vault setup token.
    pub fn vault_success(&self, setup_token: &VaultSetupToken) {
        info!(
            session_id = %self.session_id,
            correlation_id = %self.correlation_id,
            vault_token = fingerprint_token(setup_token.as_str()),
            "card saved to vault setup token",
        );
    }

    /// Records a failed vault save. The fingerprint is present when the
    /// failure happened after token creation.
    pub fn vault_failure(&self, error: &SubmitError, setup_token: Option<&VaultSetupToken>) {
        let fingerprint = setup_token.map(|token| fingerprint_token(token.as_str()));
        error!(
            session_id = %self.session_id,
            correlation_id = %self.correlation_id,
            vault_token = fingerprint.as_deref(),
            "vault save failed: {error}",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let fingerprint = fingerprint_token("4G4976714T5788300");
        assert_eq!(fingerprint.len(), FINGERPRINT_LENGTH);
        assert_eq!(fingerprint, fingerprint_token("4G4976714T5788300"));
        assert_ne!(fingerprint, fingerprint_token("4G4976714T5788301"));
        assert!(!fingerprint.contains("4G49"));
    }

    #[test]
    fn test_each_attempt_gets_its_own_correlation_id() {
        let session = SessionId::new();
        let first = Telemetry::new(session);
        let second = Telemetry::new(session);
        assert_ne!(first.correlation_id(), second.correlation_id());
    }
}
