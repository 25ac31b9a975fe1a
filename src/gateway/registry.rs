//! Wallet Registry
//!
//! Lookup table of gateways keyed by gateway identity. The registry is the
//! only path from a gateway id to a gateway instance; it is owned by the
//! composition root and shared by handle, never a global.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use super::WalletGateway;
use crate::wallet::WalletError;

/// Registered gateways by identity
#[derive(Default)]
pub struct WalletRegistry {
    gateways: RwLock<HashMap<String, Arc<dyn WalletGateway>>>,
}

impl WalletRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a gateway under its own id.
    ///
    /// A gateway already registered with the same id is replaced.
    pub fn register(&self, gateway: Arc<dyn WalletGateway>) {
        let id = gateway.id().to_string();
        if self.write().insert(id.clone(), gateway).is_some() {
            info!(gateway = %id, "Replaced registered wallet gateway");
        } else {
            debug!(gateway = %id, "Registered wallet gateway");
        }
    }

    /// Remove a gateway; unknown ids are ignored
    pub fn unregister(&self, id: &str) {
        if self.write().remove(id).is_some() {
            debug!(gateway = %id, "Unregistered wallet gateway");
        }
    }

    /// Remove every gateway
    pub fn clear(&self) {
        self.write().clear();
        debug!("Cleared wallet registry");
    }

    /// Look up a gateway by id
    pub fn find(&self, id: &str) -> Option<Arc<dyn WalletGateway>> {
        self.read().get(id).cloned()
    }

    /// Look up a gateway, failing with a `WalletError::Gateway` when absent
    pub fn resolve(&self, id: &str) -> Result<Arc<dyn WalletGateway>, WalletError> {
        self.find(id).ok_or_else(|| WalletError::gateway_not_found(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn WalletGateway>>> {
        self.gateways.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn WalletGateway>>> {
        self.gateways.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for WalletRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletRegistry")
            .field("gateways", &self.ids())
            .finish()
    }
}
