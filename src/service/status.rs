//! Transaction status sources
//!
//! A [`StatusSource`] answers "what happened to this transaction?" once per
//! monitor tick. Errors and [`StatusReport::Ambiguous`] answers are both treated
//! as transient by the monitor.
//!
//! The record's chain id selects where the lookup happens: a source that does
//! not cover that chain answers `Ambiguous` so a [`LayeredStatusSource`] moves
//! on to the next one.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::chains::wallet::WalletProvider;

/// A broadcast transaction being monitored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: String,
    /// Chain the transaction was broadcast on
    pub chain_id: u64,
}

/// One status lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    /// Mined and succeeded
    Success {
        block_number: u64,
        gas_used: u64,
        confirmations: Option<u64>,
    },
    /// Mined and reverted, or otherwise reported as failed
    Failed { message: String },
    /// Known but not yet final
    Pending,
    /// Source has no record of the hash
    NotFound,
    /// Source answered but the answer cannot be interpreted
    Ambiguous(String),
}

impl StatusReport {
    /// True for answers a caller can act on without asking another source.
    pub fn is_definitive(&self) -> bool {
        !matches!(self, StatusReport::Ambiguous(_))
    }
}

/// Source of transaction status reports.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn check(&self, record: &TransactionRecord) -> Result<StatusReport>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

// ============================================================================
// WALLET RECEIPT SOURCE
// ============================================================================

/// Reads receipts through the wallet provider on the record's chain.
pub struct ReceiptStatusSource {
    wallet: Arc<dyn WalletProvider>,
}

impl ReceiptStatusSource {
    pub fn new(wallet: Arc<dyn WalletProvider>) -> Self {
        Self { wallet }
    }
}

#[async_trait]
impl StatusSource for ReceiptStatusSource {
    async fn check(&self, record: &TransactionRecord) -> Result<StatusReport> {
        let receipt = self
            .wallet
            .get_transaction_receipt(&record.hash, record.chain_id)
            .await?;

        Ok(match receipt {
            None => StatusReport::Pending,
            Some(r) if r.success => StatusReport::Success {
                block_number: r.block_number,
                gas_used: r.gas_used,
                confirmations: None,
            },
            Some(r) => StatusReport::Failed {
                message: format!("Transaction reverted in block {}", r.block_number),
            },
        })
    }

    fn name(&self) -> &str {
        "wallet-receipt"
    }
}

// ============================================================================
// LAYERED SOURCE
// ============================================================================

/// Consults sources in order; the first definitive answer wins.
///
/// If no source gives a definitive answer, the last ambiguous answer is
/// returned, or the last error when every source failed.
pub struct LayeredStatusSource {
    sources: Vec<Arc<dyn StatusSource>>,
}

impl LayeredStatusSource {
    pub fn new(sources: Vec<Arc<dyn StatusSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl StatusSource for LayeredStatusSource {
    async fn check(&self, record: &TransactionRecord) -> Result<StatusReport> {
        let mut last_ambiguous = None;
        let mut last_error = None;

        for source in &self.sources {
            match source.check(record).await {
                Ok(report) if report.is_definitive() => return Ok(report),
                Ok(report) => {
                    debug!("{} gave no definitive answer for {}", source.name(), record.hash);
                    last_ambiguous = Some(report);
                }
                Err(e) => {
                    debug!("{} failed for {}: {:#}", source.name(), record.hash, e);
                    last_error = Some(e);
                }
            }
        }

        match (last_ambiguous, last_error) {
            (Some(report), _) => Ok(report),
            (None, Some(e)) => Err(e),
            (None, None) => Ok(StatusReport::Ambiguous("No status sources configured".to_string())),
        }
    }

    fn name(&self) -> &str {
        "layered"
    }
}
