//! Aggregate wallet state
//!
//! The state is only ever changed by dispatching a [`WalletAction`] through
//! a [`WalletStore`]. Reduction is a pure function; the store serializes
//! dispatches so concurrent use-cases never interleave their effects.

pub mod selectors;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::wallet::{
    Account, AccountsByChainId, ChainId, ConnectionStatus, ConnectionStatuses, WalletError,
};

/// Per-chain statuses and accounts plus the last reported error
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalletState {
    #[serde(rename = "connectionStatuses")]
    pub connection_statuses: ConnectionStatuses,
    pub accounts: AccountsByChainId,
    pub error: Option<WalletError>,
}

/// State transitions produced by the wallet use-cases
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletAction {
    /// A chain connected and its accounts were retrieved
    WalletConnected {
        chain_id: ChainId,
        accounts: Vec<Account>,
    },

    /// An enable attempt failed
    ConnectionFailed { error: WalletError },

    /// The last error was acknowledged
    ErrorCleared,
}

impl WalletAction {
    pub fn name(&self) -> &'static str {
        match self {
            WalletAction::WalletConnected { .. } => "wallet/connectionSucceeded",
            WalletAction::ConnectionFailed { .. } => "wallet/connectionFailed",
            WalletAction::ErrorCleared => "wallet/errorCleared",
        }
    }
}

/// Apply an action to a state.
///
/// Only the action's own chain is touched; every other entry is carried over.
pub fn reduce(mut state: WalletState, action: WalletAction) -> WalletState {
    match action {
        WalletAction::WalletConnected { chain_id, accounts } => {
            state
                .connection_statuses
                .insert(chain_id.clone(), ConnectionStatus::Connected);
            state.accounts.insert(chain_id, accounts);
            state.error = None;
        }
        WalletAction::ConnectionFailed { error } => {
            state.error = Some(error);
        }
        WalletAction::ErrorCleared => {
            state.error = None;
        }
    }
    state
}

/// Owner of the aggregate state for the lifetime of the application
#[derive(Debug, Default)]
pub struct WalletStore {
    state: RwLock<WalletState>,
}

impl WalletStore {
    /// Store with empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce an action into the state
    pub async fn dispatch(&self, action: WalletAction) {
        let name = action.name();
        let mut state = self.state.write().await;
        *state = reduce(std::mem::take(&mut *state), action);
        debug!(action = name, chains = state.connection_statuses.len(), "Action dispatched");
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> WalletState {
        self.state.read().await.clone()
    }

    /// Run a read-only projection over the current state
    pub async fn select<T>(&self, selector: impl FnOnce(&WalletState) -> T) -> T {
        selector(&*self.state.read().await)
    }
}
