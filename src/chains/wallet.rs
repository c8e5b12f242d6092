//! Wallet Provider
//!
//! The wallet is an external collaborator: it switches chains, signs and
//! broadcasts transactions, and can look up receipts. [`WalletProvider`] is the
//! seam; [`Eip1193Client`] speaks the EIP-1193 method names over JSON-RPC
//! (a browser-wallet bridge or a node with unlocked accounts).
//!
//! Every provider error is mapped into [`WalletError`] so callers never have to
//! inspect raw provider messages.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::WalletConfig;

/// EIP-1193 "user rejected request" error code.
pub const USER_REJECTED_CODE: i64 = 4001;

// ============================================================================
// TYPES
// ============================================================================

/// Wallet-originated failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("Request rejected in wallet")]
    UserRejected,

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Wallet has no connected account")]
    NoAccount,

    #[error("Wallet RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Wallet transport error: {0}")]
    Transport(String),
}

impl WalletError {
    /// Machine-readable kind for the presentation layer.
    pub fn kind(&self) -> &'static str {
        match self {
            WalletError::UserRejected => "user_rejected",
            WalletError::InsufficientFunds(_) => "insufficient_funds",
            WalletError::NoAccount => "no_account",
            WalletError::Rpc { .. } => "wallet_error",
            WalletError::Transport(_) => "wallet_unavailable",
        }
    }

    /// Maps a JSON-RPC error object from the provider.
    pub fn from_rpc(code: i64, message: &str) -> Self {
        let lower = message.to_lowercase();
        if code == USER_REJECTED_CODE
            || lower.contains("user rejected")
            || lower.contains("user denied")
        {
            WalletError::UserRejected
        } else if lower.contains("insufficient funds") {
            WalletError::InsufficientFunds(message.to_string())
        } else {
            WalletError::Rpc {
                code,
                message: message.to_string(),
            }
        }
    }
}

/// Transaction to sign and broadcast. Quantities are `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    pub value: String,
    pub data: String,
}

/// Subset of a transaction receipt the core cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
    /// True when the receipt status is 0x1
    pub success: bool,
}

/// Asynchronous wallet operations.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the wallet to switch to `chain_id`.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    /// Signs and broadcasts a transaction, returning its hash.
    async fn send_transaction(&self, request: &TransactionRequest) -> Result<String, WalletError>;

    /// Connected accounts, primary first.
    async fn get_accounts(&self) -> Result<Vec<String>, WalletError>;

    /// Chain the wallet is currently on.
    async fn get_chain_id(&self) -> Result<u64, WalletError>;

    /// Receipt for `tx_hash` on `chain_id`, or `None` while not yet mined.
    async fn get_transaction_receipt(
        &self,
        tx_hash: &str,
        chain_id: u64,
    ) -> Result<Option<TransactionReceipt>, WalletError>;
}

// ============================================================================
// JSON-RPC PLUMBING
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Vec<serde_json::Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    block_number: Option<String>,
    gas_used: Option<String>,
    status: Option<String>,
}

/// Parses a `0x`-prefixed hex quantity.
pub fn parse_hex_u64(value: &str) -> Option<u64> {
    u64::from_str_radix(value.strip_prefix("0x").unwrap_or(value), 16).ok()
}

// ============================================================================
// EIP-1193 CLIENT
// ============================================================================

/// Wallet provider backed by an EIP-1193 JSON-RPC endpoint.
pub struct Eip1193Client {
    client: Client,
    rpc_url: String,
}

impl Eip1193Client {
    /// Creates a client for the configured wallet endpoint.
    pub fn new(config: &WalletConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .no_proxy()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            rpc_url: config.rpc_url.clone(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<Option<T>, WalletError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };
        debug!("Wallet request {}", method);

        let response: JsonRpcResponse<T> = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::Transport(format!("{} request failed: {}", method, e)))?
            .json()
            .await
            .map_err(|e| WalletError::Transport(format!("{} response invalid: {}", method, e)))?;

        if let Some(error) = response.error {
            let mapped = WalletError::from_rpc(error.code, &error.message);
            warn!("Wallet {} failed: {}", method, mapped);
            return Err(mapped);
        }
        Ok(response.result)
    }

    async fn call_required<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T, WalletError> {
        self.call(method, params).await?.ok_or_else(|| WalletError::Rpc {
            code: -32603,
            message: format!("{} returned no result", method),
        })
    }
}

#[async_trait]
impl WalletProvider for Eip1193Client {
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let params = vec![serde_json::json!({ "chainId": format!("0x{:x}", chain_id) })];
        self.call::<serde_json::Value>("wallet_switchEthereumChain", params)
            .await
            .map(|_| ())
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<String, WalletError> {
        let params = vec![serde_json::to_value(request)
            .map_err(|e| WalletError::Transport(format!("Failed to encode transaction: {}", e)))?];
        self.call_required("eth_sendTransaction", params).await
    }

    async fn get_accounts(&self) -> Result<Vec<String>, WalletError> {
        Ok(self
            .call::<Vec<String>>("eth_accounts", vec![])
            .await?
            .unwrap_or_default())
    }

    async fn get_chain_id(&self) -> Result<u64, WalletError> {
        let hex: String = self.call_required("eth_chainId", vec![]).await?;
        parse_hex_u64(&hex).ok_or_else(|| WalletError::Rpc {
            code: -32603,
            message: format!("Invalid chain id: {}", hex),
        })
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: &str,
        chain_id: u64,
    ) -> Result<Option<TransactionReceipt>, WalletError> {
        let current = self.get_chain_id().await?;
        if current != chain_id {
            return Err(WalletError::Rpc {
                code: -32602,
                message: format!(
                    "Wallet is on chain {} but receipt requested for chain {}",
                    current, chain_id
                ),
            });
        }

        let receipt: Option<RpcReceipt> = self
            .call("eth_getTransactionReceipt", vec![serde_json::json!(tx_hash)])
            .await?;

        Ok(receipt.and_then(|r| {
            let block_number = r.block_number.as_deref().and_then(parse_hex_u64)?;
            Some(TransactionReceipt {
                transaction_hash: r.transaction_hash,
                block_number,
                gas_used: r.gas_used.as_deref().and_then(parse_hex_u64).unwrap_or(0),
                success: r.status.as_deref() == Some("0x1"),
            })
        }))
    }
}
