//! Contract address resolution
//!
//! Maps a contract family key (`connector@bsc-testnet@athens`) to a deployed
//! contract address. A miss here is a configuration problem, not a user error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use thiserror::Error;

use crate::config::ContractAddressConfig;
use crate::network::Network;

/// Identifies one contract in the ZetaChain address book.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractKey {
    /// Contract kind (e.g. "connector")
    pub kind: String,
    /// Address-book name of the network the contract lives on (e.g. "bsc-testnet")
    pub network_name: String,
    /// ZetaChain environment (e.g. "athens", "mainnet")
    pub zeta_network: String,
}

impl ContractKey {
    pub fn new(
        kind: impl Into<String>,
        network_name: impl Into<String>,
        zeta_network: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            network_name: network_name.into(),
            zeta_network: zeta_network.into(),
        }
    }

    /// Connector contract on `network`, paired with the ZetaChain environment it belongs to.
    pub fn connector(network: Network) -> Self {
        Self::new("connector", network.address_book_name(), network.zeta_network())
    }
}

impl Display for ContractKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}@{}", self.kind, self.network_name, self.zeta_network)
    }
}

/// Address lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No address configured for {key}")]
pub struct AddressLookupError {
    pub key: String,
}

/// Resolves contract addresses for routing.
pub trait AddressResolver: Send + Sync {
    /// Returns the `0x`-prefixed address for `key`.
    fn resolve(&self, key: &ContractKey) -> Result<String, AddressLookupError>;
}

/// In-memory address book built from `[[contract]]` config entries.
#[derive(Debug, Clone, Default)]
pub struct StaticAddressBook {
    entries: HashMap<ContractKey, String>,
}

impl StaticAddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the address book from configuration entries.
    pub fn from_config(entries: &[ContractAddressConfig]) -> Self {
        let mut book = Self::new();
        for entry in entries {
            book.insert(
                ContractKey::new(&entry.kind, &entry.network_name, &entry.zeta_network),
                entry.address.clone(),
            );
        }
        book
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, key: ContractKey, address: impl Into<String>) {
        self.entries.insert(key, address.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AddressResolver for StaticAddressBook {
    fn resolve(&self, key: &ContractKey) -> Result<String, AddressLookupError> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| AddressLookupError { key: key.to_string() })
    }
}
