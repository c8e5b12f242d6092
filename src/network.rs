//! Network Registry
//!
//! Single source of truth for network naming. Maps user-facing spellings to a
//! closed set of canonical networks, assigns chain IDs, and flags networks that
//! are recognized but not supported for transfers.
//!
//! A name that does not resolve is *unparseable*; a name that resolves to a
//! network in the deny-list is *unsupported*. Callers must keep the two apart.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Version of the alias table. Bump whenever an alias is added, removed or re-pointed.
pub const REGISTRY_VERSION: u32 = 1;

/// Chain ID returned by [`chain_id_for_name`] when a name is not recognized.
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// ZetaChain Athens-3 testnet chain ID (the hub every route goes through).
pub const ZETACHAIN_CHAIN_ID: u64 = 7001;

// ============================================================================
// CANONICAL NETWORKS
// ============================================================================

/// Canonical network identifier.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    /// Ethereum mainnet (chain ID 1).
    #[serde(rename = "ethereum")]
    Ethereum,
    /// BNB Smart Chain mainnet (chain ID 56).
    #[serde(rename = "bsc")]
    Bsc,
    /// Polygon mainnet (chain ID 137).
    #[serde(rename = "polygon")]
    Polygon,
    /// Arbitrum One (chain ID 42161).
    #[serde(rename = "arbitrum")]
    Arbitrum,
    /// Optimism mainnet (chain ID 10).
    #[serde(rename = "optimism")]
    Optimism,
    /// BNB Smart Chain testnet (chain ID 97).
    #[serde(rename = "bscTestnet")]
    BscTestnet,
    /// Polygon Mumbai testnet (chain ID 80001).
    #[serde(rename = "polygonMumbai")]
    PolygonMumbai,
    /// ZetaChain Athens-3 testnet (chain ID 7001).
    #[serde(rename = "zetachain", alias = "athens")]
    ZetaChain,
    /// Klaytn Baobab testnet (chain ID 1001).
    #[serde(rename = "klaytnBaobab")]
    KlaytnBaobab,
    /// Sepolia testnet (chain ID 11155111). Not served by ZetaChain.
    #[serde(rename = "sepolia")]
    Sepolia,
    /// Goerli testnet (chain ID 5). Deprecated.
    #[serde(rename = "goerli")]
    Goerli,
}

/// Networks that are recognized but cannot be used for a transfer.
const UNSUPPORTED: &[Network] = &[Network::Sepolia, Network::Goerli];

impl Network {
    /// Return all canonical networks.
    pub fn variants() -> &'static [Network] {
        &[
            Network::Ethereum,
            Network::Bsc,
            Network::Polygon,
            Network::Arbitrum,
            Network::Optimism,
            Network::BscTestnet,
            Network::PolygonMumbai,
            Network::ZetaChain,
            Network::KlaytnBaobab,
            Network::Sepolia,
            Network::Goerli,
        ]
    }

    /// Canonical identifier as used inside the core and in serialized intents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Bsc => "bsc",
            Network::Polygon => "polygon",
            Network::Arbitrum => "arbitrum",
            Network::Optimism => "optimism",
            Network::BscTestnet => "bscTestnet",
            Network::PolygonMumbai => "polygonMumbai",
            Network::ZetaChain => "zetachain",
            Network::KlaytnBaobab => "klaytnBaobab",
            Network::Sepolia => "sepolia",
            Network::Goerli => "goerli",
        }
    }

    /// Human-readable name for messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Network::Ethereum => "Ethereum",
            Network::Bsc => "BSC",
            Network::Polygon => "Polygon",
            Network::Arbitrum => "Arbitrum",
            Network::Optimism => "Optimism",
            Network::BscTestnet => "BSC Testnet",
            Network::PolygonMumbai => "Polygon Mumbai",
            Network::ZetaChain => "ZetaChain Athens-3",
            Network::KlaytnBaobab => "Klaytn Baobab",
            Network::Sepolia => "Sepolia",
            Network::Goerli => "Goerli",
        }
    }

    /// Numeric chain ID. Total over the enum; see [`chain_id_for_name`] for the
    /// string-keyed lookup with a fallback.
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Ethereum => 1,
            Network::Bsc => 56,
            Network::Polygon => 137,
            Network::Arbitrum => 42161,
            Network::Optimism => 10,
            Network::BscTestnet => 97,
            Network::PolygonMumbai => 80001,
            Network::ZetaChain => ZETACHAIN_CHAIN_ID,
            Network::KlaytnBaobab => 1001,
            Network::Sepolia => 11155111,
            Network::Goerli => 5,
        }
    }

    /// Reverse chain ID lookup.
    pub fn from_chain_id(chain_id: u64) -> Option<Network> {
        Network::variants()
            .iter()
            .copied()
            .find(|n| n.chain_id() == chain_id)
    }

    /// Whether this is a testnet.
    pub fn is_testnet(&self) -> bool {
        matches!(
            self,
            Network::BscTestnet
                | Network::PolygonMumbai
                | Network::ZetaChain
                | Network::KlaytnBaobab
                | Network::Sepolia
                | Network::Goerli
        )
    }

    /// Whether this is the ZetaChain hub.
    pub fn is_zetachain(&self) -> bool {
        *self == Network::ZetaChain
    }

    /// Name of this network in the ZetaChain address book (e.g. "bsc-testnet").
    pub fn address_book_name(&self) -> &'static str {
        match self {
            Network::Ethereum => "eth-mainnet",
            Network::Bsc => "bsc-mainnet",
            Network::Polygon => "polygon-mainnet",
            Network::Arbitrum => "arbitrum-mainnet",
            Network::Optimism => "optimism-mainnet",
            Network::BscTestnet => "bsc-testnet",
            Network::PolygonMumbai => "polygon-mumbai",
            Network::ZetaChain => "athens",
            Network::KlaytnBaobab => "klaytn-baobab",
            Network::Sepolia => "sepolia-testnet",
            Network::Goerli => "goerli-testnet",
        }
    }

    /// ZetaChain environment this network pairs with ("mainnet" or "athens").
    pub fn zeta_network(&self) -> &'static str {
        if self.is_testnet() {
            "athens"
        } else {
            "mainnet"
        }
    }

    /// Explorer base URL for transaction pages on this network.
    pub fn explorer_tx_base(&self) -> &'static str {
        explorer_tx_base(self.chain_id())
    }

    /// Resolves a canonical identifier (as emitted by the remote parse service).
    ///
    /// Unlike [`normalize`], only canonical identifiers are accepted; user-facing
    /// aliases such as "eth" or "bsc testnet" are rejected. Comparison ignores case
    /// and surrounding whitespace. "athens" is accepted as the legacy id of ZetaChain.
    pub fn from_canonical(id: &str) -> Option<Network> {
        let id = id.trim();
        if id.eq_ignore_ascii_case("athens") {
            return Some(Network::ZetaChain);
        }
        Network::variants()
            .iter()
            .copied()
            .find(|n| n.as_str().eq_ignore_ascii_case(id))
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ALIAS TABLE
// ============================================================================

static ALIASES: Lazy<HashMap<&'static str, Network>> = Lazy::new(|| {
    let mut m = HashMap::new();
    // single-word names
    m.insert("ethereum", Network::Ethereum);
    m.insert("eth", Network::Ethereum);
    m.insert("bsc", Network::Bsc);
    m.insert("polygon", Network::Polygon);
    m.insert("arbitrum", Network::Arbitrum);
    m.insert("optimism", Network::Optimism);
    m.insert("sepolia", Network::Sepolia);
    m.insert("goerli", Network::Goerli);
    // multi-word names, spaced and collapsed
    m.insert("bsc testnet", Network::BscTestnet);
    m.insert("bsctestnet", Network::BscTestnet);
    m.insert("polygon mumbai", Network::PolygonMumbai);
    m.insert("polygonmumbai", Network::PolygonMumbai);
    m.insert("klaytn baobab", Network::KlaytnBaobab);
    m.insert("klaytnbaobab", Network::KlaytnBaobab);
    // ZetaChain and its testnet spellings
    m.insert("zetachain", Network::ZetaChain);
    m.insert("zetachain athens", Network::ZetaChain);
    m.insert("zetachain athens-3", Network::ZetaChain);
    m.insert("athens", Network::ZetaChain);
    m.insert("athens-3", Network::ZetaChain);
    m.insert("zeta", Network::ZetaChain);
    m.insert("zeta testnet", Network::ZetaChain);
    m
});

/// Lowercases, trims and collapses internal whitespace runs to a single space.
fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ============================================================================
// REGISTRY OPERATIONS
// ============================================================================

/// Resolves a user-facing network name to its canonical network.
///
/// # Arguments
///
/// * `raw` - Network phrase as typed (e.g. "BSC Testnet", " eth ")
///
/// # Returns
///
/// * `Some(Network)` - The name is in the alias table
/// * `None` - The name is not recognized (unparseable, not "unsupported")
pub fn normalize(raw: &str) -> Option<Network> {
    ALIASES.get(normalize_key(raw).as_str()).copied()
}

/// Returns true if the network is recognized but denied for transfers.
pub fn is_unsupported(network: Network) -> bool {
    UNSUPPORTED.contains(&network)
}

/// Networks that can be used in a transfer, for user guidance.
pub fn supported_networks() -> Vec<Network> {
    Network::variants()
        .iter()
        .copied()
        .filter(|n| !is_unsupported(*n))
        .collect()
}

/// Chain ID for a network name, falling back to [`DEFAULT_CHAIN_ID`] (Ethereum
/// mainnet) when the name does not resolve.
///
/// The fallback silently points unknown names at mainnet. Prefer
/// [`normalize`] followed by [`Network::chain_id`] in new code.
pub fn chain_id_for_name(raw: &str) -> u64 {
    normalize(raw)
        .or_else(|| Network::from_canonical(raw))
        .map(|n| n.chain_id())
        .unwrap_or(DEFAULT_CHAIN_ID)
}

// ============================================================================
// EXPLORER URLS
// ============================================================================

/// Explorer transaction-page base URL for a chain ID. Unknown IDs use etherscan.
pub fn explorer_tx_base(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "https://etherscan.io/tx/",
        56 => "https://bscscan.com/tx/",
        137 => "https://polygonscan.com/tx/",
        42161 => "https://arbiscan.io/tx/",
        10 => "https://optimistic.etherscan.io/tx/",
        11155111 => "https://sepolia.etherscan.io/tx/",
        97 => "https://testnet.bscscan.com/tx/",
        80001 => "https://mumbai.polygonscan.com/tx/",
        ZETACHAIN_CHAIN_ID => "https://zetachain-athens-3.blockscout.com/tx/",
        _ => "https://etherscan.io/tx/",
    }
}

/// Full explorer URL for a transaction hash on a chain.
pub fn explorer_tx_url(chain_id: u64, tx_hash: &str) -> String {
    format!("{}{}", explorer_tx_base(chain_id), tx_hash)
}
