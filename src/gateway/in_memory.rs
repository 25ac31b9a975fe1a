//! In-memory Wallet Gateway
//!
//! Fully caller-controlled gateway used to drive the orchestration logic
//! deterministically, and as the gateway type loaded from configuration.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::WalletGateway;
use crate::wallet::{Account, ChainId, WalletError};

#[derive(Debug, Default)]
struct GatewayState {
    available: bool,
    connected: bool,
    accounts: HashMap<ChainId, Vec<Account>>,
    enabled_chains: HashSet<ChainId>,
}

/// Gateway whose availability, connectivity and accounts are set explicitly
///
/// Setters take `&self` so the gateway can be reconfigured after it has been
/// registered behind an `Arc`.
pub struct InMemoryWalletGateway {
    id: String,
    state: RwLock<GatewayState>,
}

impl InMemoryWalletGateway {
    /// Create an unavailable, disconnected gateway with no accounts
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            state: RwLock::new(GatewayState::default()),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.write().available = available;
    }

    pub fn set_connected(&self, connected: bool) {
        self.write().connected = connected;
    }

    /// Replace the accounts returned for a chain
    pub fn set_accounts(&self, chain_id: &str, accounts: Vec<Account>) {
        self.write().accounts.insert(chain_id.to_string(), accounts);
    }

    /// Builder-style availability
    pub fn with_available(self, available: bool) -> Self {
        self.set_available(available);
        self
    }

    /// Builder-style connectivity
    pub fn with_connected(self, connected: bool) -> Self {
        self.set_connected(connected);
        self
    }

    /// Builder-style accounts for a chain
    pub fn with_accounts(self, chain_id: &str, accounts: Vec<Account>) -> Self {
        self.set_accounts(chain_id, accounts);
        self
    }

    /// Whether `connect` has succeeded for this chain
    pub fn is_chain_enabled(&self, chain_id: &str) -> bool {
        self.read().enabled_chains.contains(chain_id)
    }

    // Every write leaves the state coherent, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, GatewayState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, GatewayState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl WalletGateway for InMemoryWalletGateway {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_available(&self) -> bool {
        self.read().available
    }

    fn is_connected(&self) -> bool {
        self.read().connected
    }

    async fn connect(&self, chain_id: &str) -> Result<(), WalletError> {
        let mut state = self.write();
        if !state.available {
            return Err(WalletError::Connection);
        }

        state.connected = true;
        state.enabled_chains.insert(chain_id.to_string());
        debug!(gateway = %self.id, chain_id, "In-memory gateway connected");
        Ok(())
    }

    async fn get_accounts(&self, chain_id: &str) -> Result<Vec<Account>, WalletError> {
        Ok(self.read().accounts.get(chain_id).cloned().unwrap_or_default())
    }
}

impl std::fmt::Debug for InMemoryWalletGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("InMemoryWalletGateway")
            .field("id", &self.id)
            .field("available", &state.available)
            .field("connected", &state.connected)
            .field("chains", &state.accounts.len())
            .finish()
    }
}
