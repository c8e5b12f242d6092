//! Transfer intents
//!
//! A [`TransferIntent`] is the structured form of "move `amount` of `token`
//! from network A to network B". It is produced either by the text grammar
//! ([`parser`]) or by validating a remote parse-service payload ([`schema`]),
//! and is immutable once built.

pub mod classify;
pub mod parser;
pub mod schema;

use serde::{Deserialize, Serialize};

use crate::network::{self, Network};

pub use classify::{classify, TransferClassification};
pub use parser::parse;
pub use schema::{validate_remote_intent, RemoteIntent};

/// Kind of action an intent asks for. Only transfers exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Transfer,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Transfer => "transfer",
        }
    }
}

/// Structured transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferIntent {
    /// Requested action
    pub action: ActionKind,
    /// Decimal amount as typed (e.g. "0.001")
    pub amount: String,
    /// Token symbol, upper-cased (e.g. "ETH")
    pub token: String,
    /// Source network
    pub from: Network,
    /// Destination network
    pub to: Network,
    /// True when either endpoint is in the unsupported deny-list
    pub has_unsupported_network: bool,
}

impl TransferIntent {
    /// Builds a transfer intent, upper-casing the token and deriving the
    /// unsupported-network flag from the registry.
    pub fn transfer(amount: impl Into<String>, token: &str, from: Network, to: Network) -> Self {
        Self {
            action: ActionKind::Transfer,
            amount: amount.into(),
            token: token.trim().to_uppercase(),
            from,
            to,
            has_unsupported_network: network::is_unsupported(from) || network::is_unsupported(to),
        }
    }

    /// Endpoints that are in the deny-list, in (from, to) order.
    pub fn unsupported_networks(&self) -> Vec<Network> {
        let mut out = Vec::new();
        if network::is_unsupported(self.from) {
            out.push(self.from);
        }
        if network::is_unsupported(self.to) && self.to != self.from {
            out.push(self.to);
        }
        out
    }
}
