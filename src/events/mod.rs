//! Wallet domain events
//!
//! Events published by the wallet use-cases. On the wire each event is a
//! discriminated `{ "type": ..., "payload": ... }` object so subscribers in
//! other processes can dispatch on the topic name.

pub mod bus;

pub use bus::{EventPublisher, InMemoryEventBus, Subscription};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wallet::{Account, ChainId, GatewayId};

/// Topic of accounts retrieval events
pub const ACCOUNTS_RETRIEVED: &str = "wallet/accountsRetrieved";

/// Topic of successful end-to-end connection events
pub const WALLET_CONNECTED: &str = "wallet/walletConnected";

/// Events emitted by the wallet domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum WalletEvent {
    /// Accounts were retrieved for a chain
    #[serde(rename = "wallet/accountsRetrieved")]
    AccountsRetrieved {
        #[serde(rename = "chainId")]
        chain_id: ChainId,
        accounts: Vec<Account>,
    },

    /// A chain was connected successfully
    #[serde(rename = "wallet/walletConnected")]
    WalletConnected {
        #[serde(rename = "gatewayId")]
        gateway_id: GatewayId,
        #[serde(rename = "chainId")]
        chain_id: ChainId,
    },
}

impl WalletEvent {
    /// Topic name of the event
    pub fn topic(&self) -> &'static str {
        match self {
            WalletEvent::AccountsRetrieved { .. } => ACCOUNTS_RETRIEVED,
            WalletEvent::WalletConnected { .. } => WALLET_CONNECTED,
        }
    }

    pub fn chain_id(&self) -> &str {
        match self {
            WalletEvent::AccountsRetrieved { chain_id, .. } => chain_id,
            WalletEvent::WalletConnected { chain_id, .. } => chain_id,
        }
    }
}

/// A published event with its publication time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: WalletEvent,
    pub published_at: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn new(event: WalletEvent) -> Self {
        Self {
            event,
            published_at: Utc::now(),
        }
    }

    pub fn topic(&self) -> &'static str {
        self.event.topic()
    }
}

/// Topic filter for subscriptions
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Accepted topics; empty accepts everything
    pub topics: Vec<String>,
}

impl EventFilter {
    /// Accept every topic
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept a single topic
    pub fn topic(topic: &str) -> Self {
        Self {
            topics: vec![topic.to_string()],
        }
    }

    pub fn matches(&self, event: &WalletEvent) -> bool {
        self.topics.is_empty() || self.topics.iter().any(|t| t == event.topic())
    }
}
