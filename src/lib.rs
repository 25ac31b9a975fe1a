//! wallet-gateway - Multi-chain wallet connection orchestration
//!
//! Wallet providers sit behind the `WalletGateway` trait and are looked up
//! through a `WalletRegistry`. The `EnableWallet` use-case drives one
//! connection attempt per chain, records the outcome in a `WalletStore` and
//! publishes domain events on an in-process bus.

pub mod config;
pub mod events;
pub mod gateway;
pub mod runtime;
pub mod store;
pub mod usecases;
pub mod wallet;

pub use config::WalletConfig;
pub use events::{EventFilter, EventPublisher, InMemoryEventBus, WalletEvent};
pub use gateway::{InMemoryWalletGateway, WalletGateway, WalletRegistry};
pub use runtime::WalletRuntime;
pub use store::{WalletAction, WalletState, WalletStore};
pub use usecases::EnableWallet;
pub use wallet::{Account, AccountBuilder, ConnectionStatus, WalletError};
