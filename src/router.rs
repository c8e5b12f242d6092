//! Transaction Router
//!
//! Chooses the execution path for a validated intent based on its
//! (source, destination) pairing:
//!
//! 1. **Deposit into ZetaChain** (`to` is ZetaChain): connector on the source
//!    network, destination chain is the ZetaChain hub.
//! 2. **Withdraw from ZetaChain** (`from` is ZetaChain): connector keyed by
//!    (ZetaChain, ZetaChain), destination chain from a dedicated lookup.
//! 3. **Connector hop** (neither endpoint is ZetaChain): connector on the
//!    source network, which still relays through ZetaChain.
//!
//! Every path then checks the amount and token and resolves the contract
//! address. Nothing here talks to a wallet; a failed route leaves no state behind.

use ethereum_types::U256;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::chains::addresses::{AddressResolver, ContractKey};
use crate::chains::wallet::TransactionRequest;
use crate::intent::schema::is_positive_amount;
use crate::intent::TransferIntent;
use crate::network::{self, Network, ZETACHAIN_CHAIN_ID};

/// Number of decimals of the native asset.
pub const NATIVE_DECIMALS: usize = 18;

/// Source networks that host a ZetaChain connector.
const CONNECTOR_SOURCES: &[Network] = &[
    Network::Ethereum,
    Network::Bsc,
    Network::BscTestnet,
    Network::PolygonMumbai,
];

// ============================================================================
// ERRORS
// ============================================================================

/// Reasons an intent cannot be turned into an execution plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Invalid transfer amount: {0}")]
    InvalidAmount(String),

    #[error("Token {0} is not supported; only native ETH transfers are routed")]
    UnsupportedToken(String),

    #[error("No route from {from} to {to}: {reason}")]
    UnroutableIntent {
        from: Network,
        to: Network,
        reason: String,
    },

    #[error("Failed to resolve contract address for {key}: {reason}")]
    AddressResolutionFailed { key: String, reason: String },
}

impl RouteError {
    /// Machine-readable kind for the presentation layer.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::InvalidAmount(_) => "invalid_amount",
            RouteError::UnsupportedToken(_) => "unsupported_token",
            RouteError::UnroutableIntent { .. } => "unroutable_intent",
            RouteError::AddressResolutionFailed { .. } => "address_resolution_failed",
        }
    }
}

// ============================================================================
// EXECUTION PLAN
// ============================================================================

/// Which of the three routing paths was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    DepositToZetaChain,
    WithdrawFromZetaChain,
    ConnectorHop,
}

/// Everything needed to build a signing request for one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub route: RouteKind,
    /// Contract family the address was resolved from
    pub contract_key: ContractKey,
    /// Resolved contract address (transaction recipient)
    pub contract_address: String,
    /// Wallet address that will sign
    pub sender: String,
    pub token: String,
    /// Amount as typed
    pub amount: String,
    /// Amount scaled to wei, truncated
    #[serde(with = "wei_decimal")]
    pub amount_wei: U256,
    pub from: Network,
    pub to: Network,
    pub source_chain_id: u64,
    pub dest_chain_id: u64,
}

impl ExecutionPlan {
    /// Native-asset transfer to the resolved contract with empty calldata.
    pub fn transaction_request(&self) -> TransactionRequest {
        TransactionRequest {
            from: Some(self.sender.clone()),
            to: self.contract_address.clone(),
            value: format!("{:#x}", self.amount_wei),
            data: "0x".to_string(),
        }
    }

    /// Short user-facing description of the transfer.
    pub fn note(&self) -> String {
        match self.route {
            RouteKind::DepositToZetaChain => format!(
                "Depositing {} {} from {} into ZetaChain Athens-3",
                self.amount,
                self.token,
                self.from.display_name()
            ),
            RouteKind::WithdrawFromZetaChain => format!(
                "Sending {} {} from ZetaChain to {} (gas paid in ZETA)",
                self.amount,
                self.token,
                self.to.display_name()
            ),
            RouteKind::ConnectorHop => format!(
                "Sending {} {} from {} to {} via ZetaChain",
                self.amount,
                self.token,
                self.from.display_name(),
                self.to.display_name()
            ),
        }
    }
}

mod wei_decimal {
    use ethereum_types::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_dec_str(&s).map_err(|e| serde::de::Error::custom(format!("{:?}", e)))
    }
}

// ============================================================================
// AMOUNT SCALING
// ============================================================================

/// Scales a decimal amount to wei (`amount × 10^18`), truncating extra decimals.
///
/// Only plain decimal notation is accepted ("1", "0.01"). The result must be
/// strictly positive: an amount that truncates to zero wei is rejected.
pub fn to_wei(amount: &str) -> Result<U256, RouteError> {
    let invalid = || RouteError::InvalidAmount(amount.to_string());
    let trimmed = amount.trim();

    if !is_positive_amount(trimmed) {
        return Err(invalid());
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    let whole = if whole.is_empty() { "0" } else { whole };
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let mut digits = String::with_capacity(whole.len() + NATIVE_DECIMALS);
    digits.push_str(whole);
    let kept = &fraction[..fraction.len().min(NATIVE_DECIMALS)];
    digits.push_str(kept);
    digits.extend(std::iter::repeat('0').take(NATIVE_DECIMALS - kept.len()));

    let wei = U256::from_dec_str(&digits).map_err(|_| invalid())?;
    if wei.is_zero() {
        return Err(invalid());
    }
    Ok(wei)
}

// ============================================================================
// ROUTER
// ============================================================================

/// Destination chain IDs reachable by withdrawing from ZetaChain.
fn withdrawal_destination(to: Network) -> Option<u64> {
    match to {
        Network::Bsc
        | Network::BscTestnet
        | Network::Polygon
        | Network::PolygonMumbai
        | Network::Ethereum => Some(to.chain_id()),
        _ => None,
    }
}

/// Selects execution paths and resolves contract addresses.
#[derive(Clone)]
pub struct TransactionRouter {
    resolver: Arc<dyn AddressResolver>,
}

impl TransactionRouter {
    pub fn new(resolver: Arc<dyn AddressResolver>) -> Self {
        Self { resolver }
    }

    /// Builds the execution plan for an intent.
    ///
    /// # Arguments
    ///
    /// * `intent` - Parsed transfer intent
    /// * `wallet_address` - Address that will sign the transaction
    ///
    /// # Returns
    ///
    /// * `Ok(ExecutionPlan)` - Path selected, amount/token valid, address resolved
    /// * `Err(RouteError)` - No path exists or a validation step failed
    pub fn route(
        &self,
        intent: &TransferIntent,
        wallet_address: &str,
    ) -> Result<ExecutionPlan, RouteError> {
        let (from, to) = (intent.from, intent.to);
        let unroutable = |reason: &str| RouteError::UnroutableIntent {
            from,
            to,
            reason: reason.to_string(),
        };

        if network::is_unsupported(from) || network::is_unsupported(to) {
            return Err(unroutable("network is not supported by ZetaChain"));
        }
        if from == to {
            return Err(unroutable("source and destination are the same network"));
        }

        let (route, key, source_chain_id, dest_chain_id) = if to.is_zetachain() {
            if !CONNECTOR_SOURCES.contains(&from) {
                return Err(unroutable("source network has no ZetaChain connector"));
            }
            (
                RouteKind::DepositToZetaChain,
                ContractKey::connector(from),
                from.chain_id(),
                ZETACHAIN_CHAIN_ID,
            )
        } else if from.is_zetachain() {
            let dest = withdrawal_destination(to)
                .ok_or_else(|| unroutable("destination is not reachable from ZetaChain"))?;
            (
                RouteKind::WithdrawFromZetaChain,
                ContractKey::connector(Network::ZetaChain),
                ZETACHAIN_CHAIN_ID,
                dest,
            )
        } else {
            if !CONNECTOR_SOURCES.contains(&from) {
                return Err(unroutable("source network has no ZetaChain connector"));
            }
            (
                RouteKind::ConnectorHop,
                ContractKey::connector(from),
                from.chain_id(),
                to.chain_id(),
            )
        };
        debug!("Selected {:?} via {}", route, key);

        let amount_wei = to_wei(&intent.amount)?;

        if !intent.token.eq_ignore_ascii_case("eth") {
            return Err(RouteError::UnsupportedToken(intent.token.clone()));
        }

        let contract_address = self.resolver.resolve(&key).map_err(|e| {
            RouteError::AddressResolutionFailed {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })?;

        info!(
            "Routed {} {} {} -> {} ({:?}, contract {})",
            intent.amount, intent.token, from, to, route, contract_address
        );

        Ok(ExecutionPlan {
            route,
            contract_key: key,
            contract_address,
            sender: wallet_address.to_string(),
            token: intent.token.to_uppercase(),
            amount: intent.amount.clone(),
            amount_wei,
            from,
            to,
            source_chain_id,
            dest_chain_id,
        })
    }
}
