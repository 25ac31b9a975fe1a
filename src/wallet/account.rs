//! Account value type and its builder

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An account exposed by a wallet gateway
///
/// Immutable once built; two accounts are equal iff address and public key match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    address: String,
    #[serde(
        rename = "publicKey",
        serialize_with = "serialize_hex",
        deserialize_with = "deserialize_hex"
    )]
    public_key: Vec<u8>,
}

impl Account {
    /// Start building an account
    pub fn builder() -> AccountBuilder {
        AccountBuilder::new()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Public key as a lowercase hex string
    pub fn public_key_hex(&self) -> String {
        hex::encode(&self.public_key)
    }
}

/// Missing field detected by [`AccountBuilder::build`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountBuildError {
    #[error("Account address is required")]
    MissingAddress,

    #[error("Account public key is required")]
    MissingPublicKey,
}

/// Builder for [`Account`]
///
/// Both the address and the public key must be supplied before `build`.
#[derive(Debug, Clone, Default)]
pub struct AccountBuilder {
    address: Option<String>,
    public_key: Option<Vec<u8>>,
}

impl AccountBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the account address
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(address.to_string());
        self
    }

    /// Set the raw public key bytes
    pub fn with_public_key(mut self, public_key: &[u8]) -> Self {
        self.public_key = Some(public_key.to_vec());
        self
    }

    /// Produce the account
    pub fn build(self) -> Result<Account, AccountBuildError> {
        let address = self.address.ok_or(AccountBuildError::MissingAddress)?;
        let public_key = self.public_key.ok_or(AccountBuildError::MissingPublicKey)?;

        Ok(Account {
            address,
            public_key,
        })
    }
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

fn deserialize_hex<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(deserializer)?;
    hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)
}
