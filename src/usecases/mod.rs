//! Wallet use-cases

pub mod enable_wallet;

pub use enable_wallet::EnableWallet;
