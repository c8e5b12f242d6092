//! Shared test helpers for crosschat tests
//!
//! Constants, config builders and in-memory collaborators (wallet, status
//! source) used across the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use crosschat::chains::addresses::{ContractKey, StaticAddressBook};
use crosschat::chains::wallet::{TransactionReceipt, TransactionRequest, WalletError, WalletProvider};
use crosschat::config::{Config, ContractAddressConfig, FallbackPolicy, MonitorConfig};
use crosschat::network::Network;
use crosschat::service::status::{StatusReport, StatusSource, TransactionRecord};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Dummy wallet address (EVM format, 40 hex characters)
pub const DUMMY_WALLET_ADDR: &str = "0x0000000000000000000000000000000000000001";

/// Dummy connector on BSC testnet
pub const DUMMY_CONNECTOR_BSC_TESTNET: &str = "0x0000000000000000000000000000000000000002";

/// Dummy connector on Polygon Mumbai
pub const DUMMY_CONNECTOR_MUMBAI: &str = "0x0000000000000000000000000000000000000003";

/// Dummy connector on ZetaChain Athens
pub const DUMMY_CONNECTOR_ATHENS: &str = "0x0000000000000000000000000000000000000004";

/// Dummy connector on Ethereum mainnet
pub const DUMMY_CONNECTOR_ETH: &str = "0x0000000000000000000000000000000000000005";

/// Dummy connector on BSC mainnet
pub const DUMMY_CONNECTOR_BSC: &str = "0x0000000000000000000000000000000000000006";

/// Dummy transaction hash (64 hex characters)
pub const DUMMY_TX_HASH: &str =
    "0x00000000000000000000000000000000000000000000000000000000000000aa";

// ============================================================================
// CONFIG HELPERS
// ============================================================================

fn contract(network_name: &str, zeta_network: &str, address: &str) -> ContractAddressConfig {
    ContractAddressConfig {
        kind: "connector".to_string(),
        network_name: network_name.to_string(),
        zeta_network: zeta_network.to_string(),
        address: address.to_string(),
    }
}

/// Connector entries for every routable source network.
pub fn default_contracts() -> Vec<ContractAddressConfig> {
    vec![
        contract("bsc-testnet", "athens", DUMMY_CONNECTOR_BSC_TESTNET),
        contract("polygon-mumbai", "athens", DUMMY_CONNECTOR_MUMBAI),
        contract("athens", "athens", DUMMY_CONNECTOR_ATHENS),
        contract("eth-mainnet", "mainnet", DUMMY_CONNECTOR_ETH),
        contract("bsc-mainnet", "mainnet", DUMMY_CONNECTOR_BSC),
    ]
}

/// Default configuration with the dummy address book.
pub fn create_default_config() -> Config {
    Config {
        contracts: default_contracts(),
        ..Config::default()
    }
}

/// Address book with every dummy connector.
pub fn create_address_book() -> StaticAddressBook {
    StaticAddressBook::from_config(&default_contracts())
}

/// Monitor config with the default budget and threshold.
pub fn monitor_config(policy: FallbackPolicy) -> MonitorConfig {
    MonitorConfig {
        fallback_policy: policy,
        ..MonitorConfig::default()
    }
}

/// Key of the connector on `network`.
pub fn connector_key(network: Network) -> ContractKey {
    ContractKey::connector(network)
}

// ============================================================================
// MOCK STATUS SOURCE
// ============================================================================

/// Status source that replays a script, then repeats a default answer.
pub struct ScriptedStatusSource {
    script: Mutex<VecDeque<Result<StatusReport, String>>>,
    default: Result<StatusReport, String>,
    calls: AtomicUsize,
}

impl ScriptedStatusSource {
    pub fn new(script: Vec<Result<StatusReport, String>>, default: Result<StatusReport, String>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            default,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every check fails with a transport-style error.
    pub fn always_failing() -> Self {
        Self::new(vec![], Err("explorer unreachable".to_string()))
    }

    /// Every check reports `report`.
    pub fn always(report: StatusReport) -> Self {
        Self::new(vec![], Ok(report))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedStatusSource {
    async fn check(&self, _record: &TransactionRecord) -> anyhow::Result<StatusReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front().unwrap_or_else(|| self.default.clone());
        next.map_err(|e| anyhow::anyhow!(e))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Successful explorer answer.
pub fn success_report() -> StatusReport {
    StatusReport::Success {
        block_number: 1234,
        gas_used: 21000,
        confirmations: Some(5),
    }
}

// ============================================================================
// MOCK WALLET
// ============================================================================

/// In-memory wallet recording every call.
pub struct MockWallet {
    pub accounts: Vec<String>,
    pub switch_error: Option<WalletError>,
    pub send_result: Result<String, WalletError>,
    /// When set, `send_transaction` waits for a notification before answering
    pub send_gate: Option<Arc<Notify>>,
    pub receipt: Option<TransactionReceipt>,
    pub chain_id: u64,
    pub calls: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<TransactionRequest>>,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self {
            accounts: vec![DUMMY_WALLET_ADDR.to_string()],
            switch_error: None,
            send_result: Ok(DUMMY_TX_HASH.to_string()),
            send_gate: None,
            receipt: None,
            chain_id: 7001,
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl MockWallet {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.calls.lock().push(format!("switch_chain:{}", chain_id));
        match &self.switch_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<String, WalletError> {
        self.calls.lock().push("send_transaction".to_string());
        if let Some(gate) = &self.send_gate {
            gate.notified().await;
        }
        self.sent.lock().push(request.clone());
        self.send_result.clone()
    }

    async fn get_accounts(&self) -> Result<Vec<String>, WalletError> {
        self.calls.lock().push("get_accounts".to_string());
        Ok(self.accounts.clone())
    }

    async fn get_chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.chain_id)
    }

    async fn get_transaction_receipt(
        &self,
        _tx_hash: &str,
        chain_id: u64,
    ) -> Result<Option<TransactionReceipt>, WalletError> {
        self.calls.lock().push(format!("get_transaction_receipt:{}", chain_id));
        Ok(self.receipt.clone())
    }
}
