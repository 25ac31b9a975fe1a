//! Wallet Gateways
//!
//! A gateway abstracts one concrete wallet provider (browser extension,
//! hardware device, test double). All gateways implement the `WalletGateway`
//! trait, which exposes:
//! - Identity (the registry key)
//! - Provider availability and connectivity
//! - Per-chain connection and account retrieval

pub mod in_memory;
pub mod registry;

pub use in_memory::InMemoryWalletGateway;
pub use registry::WalletRegistry;

use async_trait::async_trait;

use crate::wallet::{Account, WalletError};

/// Capability set every wallet integration provides
#[async_trait]
pub trait WalletGateway: Send + Sync {
    /// Identity of the gateway; stable for its whole lifetime
    fn id(&self) -> &str;

    /// Whether the underlying provider is present at all
    fn is_available(&self) -> bool;

    /// Whether the provider is currently connected
    fn is_connected(&self) -> bool;

    /// Establish connectivity for a chain.
    ///
    /// Must settle; timeouts are the concern of the concrete adapter.
    async fn connect(&self, chain_id: &str) -> Result<(), WalletError>;

    /// Accounts visible for a chain, in provider order.
    ///
    /// Returns an empty list rather than failing when the chain has no accounts.
    async fn get_accounts(&self, chain_id: &str) -> Result<Vec<Account>, WalletError>;
}

impl std::fmt::Debug for dyn WalletGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletGateway")
            .field("id", &self.id())
            .field("available", &self.is_available())
            .field("connected", &self.is_connected())
            .finish()
    }
}
