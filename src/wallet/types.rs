//! Per-chain connection types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Account;

/// Identity of a registered gateway, used as the registry key
pub type GatewayId = String;

/// Opaque blockchain network identifier; never validated
pub type ChainId = String;

/// Connection status of a single chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}

/// Status per chain; chains never enabled have no entry
pub type ConnectionStatuses = HashMap<ChainId, ConnectionStatus>;

/// Accounts per chain, in the order the gateway returned them
pub type AccountsByChainId = HashMap<ChainId, Vec<Account>>;
