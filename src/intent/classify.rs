//! Intent classification
//!
//! Decision order: unsupported network, then same chain, then cross chain.
//! An intent can be both same-chain and unsupported; unsupported wins.

use serde::{Deserialize, Serialize};

use super::TransferIntent;

/// Outcome of classifying a parsed intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferClassification {
    /// At least one endpoint is recognized but denied
    UnsupportedNetwork,
    /// Source and destination are the same network
    SameChainDemo,
    /// A genuine cross-chain transfer
    CrossChain,
}

/// Classifies an intent. Pure; no side effects.
pub fn classify(intent: &TransferIntent) -> TransferClassification {
    if intent.has_unsupported_network {
        return TransferClassification::UnsupportedNetwork;
    }
    if intent.from.as_str().eq_ignore_ascii_case(intent.to.as_str()) {
        return TransferClassification::SameChainDemo;
    }
    TransferClassification::CrossChain
}
