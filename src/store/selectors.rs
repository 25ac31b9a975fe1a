//! Read-only projections over [`WalletState`]

use super::WalletState;
use crate::wallet::{Account, ConnectionStatus, WalletError};

/// Status of a chain; `None` if it was never enabled
pub fn connection_status(state: &WalletState, chain_id: &str) -> Option<ConnectionStatus> {
    state.connection_statuses.get(chain_id).copied()
}

/// Accounts of a chain; empty if the chain is unknown
pub fn accounts<'a>(state: &'a WalletState, chain_id: &str) -> &'a [Account] {
    state
        .accounts
        .get(chain_id)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub fn error(state: &WalletState) -> Option<&WalletError> {
    state.error.as_ref()
}

/// Chains currently connected, sorted
pub fn connected_chains(state: &WalletState) -> Vec<&str> {
    let mut chains: Vec<&str> = state
        .connection_statuses
        .iter()
        .filter(|(_, status)| **status == ConnectionStatus::Connected)
        .map(|(chain_id, _)| chain_id.as_str())
        .collect();
    chains.sort_unstable();
    chains
}
