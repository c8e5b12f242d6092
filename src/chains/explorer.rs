//! Block Explorer Client
//!
//! Client for the Blockscout-compatible explorer API serving ZetaChain Athens-3.
//! Used as the primary transaction status source for the monitor, and for
//! balance lookups. An explorer indexes a single chain, so transactions on any
//! other chain get an `Ambiguous` answer.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ethereum_types::U256;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ExplorerConfig;
use crate::service::status::{StatusReport, StatusSource, TransactionRecord};

/// Blockscout `module=...&action=...` response envelope.
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// Account balance as reported by the explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub wei: U256,
    /// Balance in ETH with 6 decimals (e.g. "0.012500 ETH")
    pub formatted: String,
}

/// Reads a numeric field that Blockscout may encode as a string or a number.
fn field_u64(value: &serde_json::Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        serde_json::Value::String(s) if !s.is_empty() => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn field_str<'a>(value: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(|v| v.as_str())
}

/// Formats a wei amount as ETH with 6 decimals, truncating.
pub fn format_eth(wei: U256) -> String {
    let unit = U256::exp10(18);
    let whole = wei / unit;
    let micro = (wei % unit) / U256::exp10(12);
    format!("{}.{:06} ETH", whole, micro.low_u64())
}

/// HTTP client for the explorer API.
pub struct BlockscoutClient {
    client: Client,
    api_url: String,
    chain_id: u64,
}

impl BlockscoutClient {
    /// Creates a new explorer client.
    ///
    /// # Arguments
    ///
    /// * `config` - Explorer configuration (API root, indexed chain and timeout)
    ///
    /// # Returns
    ///
    /// * `Ok(BlockscoutClient)` - Successfully created client
    /// * `Err(anyhow::Error)` - Failed to create HTTP client
    pub fn new(config: &ExplorerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .no_proxy()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            chain_id: config.chain_id,
        })
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<ExplorerResponse> {
        self.client
            .get(&self.api_url)
            .query(params)
            .send()
            .await
            .context("Failed to send explorer request")?
            .error_for_status()
            .context("Explorer returned an HTTP error")?
            .json()
            .await
            .context("Failed to parse explorer response")
    }

    /// Looks up a transaction and classifies its status.
    ///
    /// # Returns
    ///
    /// * `Ok(StatusReport)` - Explorer answered (possibly ambiguously)
    /// * `Err(anyhow::Error)` - Explorer unreachable or response malformed
    pub async fn get_transaction_status(&self, tx_hash: &str) -> Result<StatusReport> {
        let response = self
            .query(&[
                ("module", "transaction"),
                ("action", "gettxinfo"),
                ("txhash", tx_hash),
            ])
            .await?;
        debug!("Explorer gettxinfo {}: status={}", tx_hash, response.status);

        if response.status != "1" {
            if response.message.to_lowercase().contains("not found") {
                return Ok(StatusReport::NotFound);
            }
            return Ok(StatusReport::Ambiguous(format!(
                "Explorer status {}: {}",
                response.status, response.message
            )));
        }

        let tx = &response.result;
        if !tx.is_object() {
            return Ok(StatusReport::Ambiguous("Explorer result is empty".to_string()));
        }

        if field_str(tx, "isError") == Some("1") {
            let message = field_str(tx, "errCode")
                .filter(|s| !s.is_empty())
                .unwrap_or("Transaction reverted")
                .to_string();
            return Ok(StatusReport::Failed { message });
        }

        match field_u64(tx, "blockNumber") {
            Some(block_number) if block_number > 0 => Ok(StatusReport::Success {
                block_number,
                gas_used: field_u64(tx, "gasUsed").unwrap_or(0),
                confirmations: field_u64(tx, "confirmations"),
            }),
            _ => Ok(StatusReport::Pending),
        }
    }

    /// Fetches the latest native balance of an address.
    pub async fn get_balance(&self, address: &str) -> Result<Balance> {
        let response = self
            .query(&[
                ("module", "account"),
                ("action", "balance"),
                ("address", address),
                ("tag", "latest"),
            ])
            .await?;

        if response.status != "1" {
            anyhow::bail!("Explorer balance lookup failed: {}", response.message);
        }
        let raw = response
            .result
            .as_str()
            .context("Explorer balance result is not a string")?;
        let wei = U256::from_dec_str(raw)
            .map_err(|e| anyhow::anyhow!("Invalid balance {}: {:?}", raw, e))?;

        Ok(Balance {
            wei,
            formatted: format_eth(wei),
        })
    }
}

#[async_trait]
impl StatusSource for BlockscoutClient {
    async fn check(&self, record: &TransactionRecord) -> Result<StatusReport> {
        if record.chain_id != self.chain_id {
            return Ok(StatusReport::Ambiguous(format!(
                "Explorer indexes chain {}, not {}",
                self.chain_id, record.chain_id
            )));
        }
        self.get_transaction_status(&record.hash).await
    }

    fn name(&self) -> &str {
        "blockscout"
    }
}
