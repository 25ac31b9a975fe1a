//! Wallet runtime
//!
//! Composition root: owns the registry, the store and the event bus, and
//! hands shared handles of them to the use-cases.

use std::sync::Arc;
use tracing::info;

use crate::config::WalletConfig;
use crate::events::{EventFilter, InMemoryEventBus, Subscription};
use crate::gateway::{WalletGateway, WalletRegistry};
use crate::store::WalletStore;
use crate::usecases::EnableWallet;
use crate::wallet::WalletError;

/// Registry, store and bus wired together
pub struct WalletRuntime {
    registry: Arc<WalletRegistry>,
    store: Arc<WalletStore>,
    bus: Arc<InMemoryEventBus>,
    enable_wallet: EnableWallet,
}

impl WalletRuntime {
    /// Create a runtime with no gateways and an empty store
    pub fn new() -> Self {
        let registry = Arc::new(WalletRegistry::new());
        let store = Arc::new(WalletStore::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let enable_wallet = EnableWallet::new(registry.clone(), store.clone(), bus.clone());

        Self {
            registry,
            store,
            bus,
            enable_wallet,
        }
    }

    /// Create a runtime and register every configured gateway
    pub fn from_config(config: &WalletConfig) -> Result<Self, WalletError> {
        let runtime = Self::new();
        for gateway in &config.gateways {
            runtime.register(Arc::new(gateway.build()?));
        }

        info!(gateways = runtime.registry.len(), "Wallet runtime ready");
        Ok(runtime)
    }

    pub fn register(&self, gateway: Arc<dyn WalletGateway>) {
        self.registry.register(gateway);
    }

    pub fn registry(&self) -> &Arc<WalletRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<WalletStore> {
        &self.store
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.bus.subscribe(filter)
    }

    /// Enable one chain on one gateway
    pub async fn enable_wallet(&self, gateway_id: &str, chain_id: &str) {
        self.enable_wallet.enable_wallet(gateway_id, chain_id).await
    }

    /// Enable several chains, one after another
    pub async fn enable_chains(&self, gateway_id: &str, chain_ids: &[String]) {
        for chain_id in chain_ids {
            self.enable_wallet(gateway_id, chain_id).await;
        }
    }

    /// Enable several chains with their attempts interleaved
    pub async fn enable_chains_concurrently(&self, gateway_id: &str, chain_ids: &[String]) {
        futures_util::future::join_all(
            chain_ids
                .iter()
                .map(|chain_id| self.enable_wallet(gateway_id, chain_id)),
        )
        .await;
    }
}

impl Default for WalletRuntime {
    fn default() -> Self {
        Self::new()
    }
}
