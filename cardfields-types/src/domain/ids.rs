//! Identifier types for processor-side resources.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when a creation callback resolves with a value that
/// cannot be a processor identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("not a plausible processor identifier")]
pub struct InvalidProcessorId;

/// Characters the processor uses in order ids and vault setup tokens.
fn is_plausible_id(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 128
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Identifier of an order created on the integrator's server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderId {
    type Err = InvalidProcessorId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_plausible_id(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidProcessorId)
        }
    }
}

/// Identifier of a vault setup token created on the integrator's server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultSetupToken(String);

impl VaultSetupToken {
    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VaultSetupToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for VaultSetupToken {
    type Err = InvalidProcessorId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_plausible_id(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidProcessorId)
        }
    }
}

/// Unique identifier for one card fields session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random SessionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_accepts_processor_shapes() {
        assert!("5O190127TN364715T".parse::<OrderId>().is_ok());
        assert!("8kk80252ml614060l".parse::<OrderId>().is_ok());
        assert!("order_ab-12.3".parse::<OrderId>().is_ok());
    }

    #[test]
    fn test_order_id_rejects_implausible_values() {
        assert_eq!("".parse::<OrderId>(), Err(InvalidProcessorId));
        assert_eq!("   ".parse::<OrderId>(), Err(InvalidProcessorId));
        assert_eq!("id with spaces".parse::<OrderId>(), Err(InvalidProcessorId));
        assert_eq!("line\nbreak".parse::<OrderId>(), Err(InvalidProcessorId));
        assert_eq!("<script>".parse::<OrderId>(), Err(InvalidProcessorId));
        assert!("x".repeat(129).parse::<OrderId>().is_err());
    }

    #[test]
    fn test_vault_setup_token_roundtrip() {
        let token: VaultSetupToken = "4G4976714T5788300".parse().unwrap();
        assert_eq!(token.as_str(), "4G4976714T5788300");
        assert_eq!(token.to_string(), "4G4976714T5788300");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id: OrderId = "5O190127TN364715T".parse().unwrap();
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"5O190127TN364715T\""
        );
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
