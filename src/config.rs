//! Gateway configuration
//!
//! Describes the in-memory gateways the composition root registers at
//! startup. Public keys are hex encoded.
//!
//! ```json
//! {
//!   "gateways": [
//!     {
//!       "id": "keplr",
//!       "available": true,
//!       "connected": true,
//!       "accounts": {
//!         "okp4-nemeton-1": [{ "address": "okp41...", "public_key": "02ab..." }]
//!       }
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::gateway::InMemoryWalletGateway;
use crate::wallet::{Account, WalletError};

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default)]
    pub gateways: Vec<GatewayConfig>,
}

/// One gateway entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub id: String,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default = "default_true")]
    pub connected: bool,
    /// Accounts keyed by chain id
    #[serde(default)]
    pub accounts: BTreeMap<String, Vec<AccountConfig>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub address: String,
    pub public_key: String,
}

fn default_true() -> bool {
    true
}

impl WalletConfig {
    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self, WalletError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| WalletError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, WalletError> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl AccountConfig {
    pub fn to_account(&self) -> Result<Account, WalletError> {
        let key = self.public_key.strip_prefix("0x").unwrap_or(&self.public_key);
        let public_key = hex::decode(key)?;

        Account::builder()
            .with_address(&self.address)
            .with_public_key(&public_key)
            .build()
            .map_err(|e| WalletError::Config(e.to_string()))
    }
}

impl GatewayConfig {
    /// Build the configured gateway
    pub fn build(&self) -> Result<InMemoryWalletGateway, WalletError> {
        let mut gateway = InMemoryWalletGateway::new(&self.id)
            .with_available(self.available)
            .with_connected(self.connected);

        for (chain_id, accounts) in &self.accounts {
            let accounts = accounts
                .iter()
                .map(AccountConfig::to_account)
                .collect::<Result<Vec<_>, _>>()?;
            gateway = gateway.with_accounts(chain_id, accounts);
        }

        Ok(gateway)
    }
}
