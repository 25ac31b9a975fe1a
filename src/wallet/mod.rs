//! Wallet domain types
//!
//! Value types shared by gateways, the store and the orchestration use-cases:
//! accounts, per-chain connection status and the wallet error taxonomy.

pub mod account;
pub mod types;

/// Errors surfaced by wallet orchestration
///
/// These are written into the aggregate state as the last reported error,
/// so the type is cloneable and comparable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// The gateway identity is unknown to the registry
    #[error("No gateway was found with this wallet id: {0}")]
    Gateway(String),

    /// The gateway is registered but unusable (provider absent or not connected)
    #[error("Connection error")]
    Connection,

    /// The gateway itself failed while connecting or retrieving accounts
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WalletError {
    /// Build the resolution failure for an unknown gateway id
    pub fn gateway_not_found(gateway_id: &str) -> Self {
        WalletError::Gateway(gateway_id.to_string())
    }

    /// Stable kind name, used in logs and serialized state
    pub fn kind(&self) -> &'static str {
        match self {
            WalletError::Gateway(_) => "GatewayError",
            WalletError::Connection => "ConnectionError",
            WalletError::Provider(_) => "ProviderError",
            WalletError::Config(_) => "ConfigError",
        }
    }
}

impl serde::Serialize for WalletError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("WalletError", 2)?;
        state.serialize_field("name", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::Config(err.to_string())
    }
}

impl From<hex::FromHexError> for WalletError {
    fn from(err: hex::FromHexError) -> Self {
        WalletError::Config(format!("Invalid public key: {}", err))
    }
}

pub use account::{Account, AccountBuildError, AccountBuilder};
pub use types::{AccountsByChainId, ChainId, ConnectionStatus, ConnectionStatuses, GatewayId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_message() {
        let err = WalletError::gateway_not_found("keplr");
        assert_eq!(
            err.to_string(),
            "No gateway was found with this wallet id: keplr"
        );
        assert_eq!(err.kind(), "GatewayError");
    }

    #[test]
    fn test_connection_errors_compare_equal() {
        assert_eq!(WalletError::Connection, WalletError::Connection);
        assert_ne!(
            WalletError::Connection,
            WalletError::gateway_not_found("keplr")
        );
    }

    #[test]
    fn test_error_serializes_name_and_message() {
        let json = serde_json::to_value(WalletError::Connection).unwrap();
        assert_eq!(json["name"], "ConnectionError");
        assert_eq!(json["message"], "Connection error");
    }
}
