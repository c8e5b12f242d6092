//! Configuration Management Module
//!
//! This module handles loading and managing configuration for crosschat.
//! Configuration includes the wallet endpoint, the remote parse service, the
//! block explorer, monitor timing, and the contract address book.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::network::ZETACHAIN_CHAIN_ID;

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Wallet provider endpoint
    #[serde(default)]
    pub wallet: WalletConfig,
    /// Remote intent-parsing service
    #[serde(default)]
    pub parse_service: ParseServiceConfig,
    /// Block explorer API
    #[serde(default)]
    pub explorer: ExplorerConfig,
    /// Transaction monitor timing
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Contract address book (use [[contract]] in TOML)
    #[serde(default, rename = "contract")]
    pub contracts: Vec<ContractAddressConfig>,
}

/// EIP-1193 JSON-RPC wallet endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// JSON-RPC URL of the wallet bridge or node
    pub rpc_url: String,
    /// Per-request timeout in milliseconds. Signing requests wait on a human.
    #[serde(default = "default_wallet_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Remote intent-parsing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseServiceConfig {
    /// Whether to fall back to the service when the local grammar does not match
    #[serde(default)]
    pub enabled: bool,
    /// Base URL (POST {base_url}/parse)
    pub base_url: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_http_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Blockscout-compatible explorer API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// API root (e.g. "https://zetachain-athens-3.blockscout.com/api")
    pub api_url: String,
    /// Chain indexed by this explorer; other chains are left to the wallet receipts
    #[serde(default = "default_explorer_chain_id")]
    pub chain_id: u64,
    /// Request timeout in milliseconds
    #[serde(default = "default_http_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// What the monitor reports when it cannot get positive evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Report a fallback confirmation (the wallet already accepted the transaction)
    Optimistic,
    /// Report network_error / timeout instead
    Strict,
}

/// Transaction monitor timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Interval between status checks in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Maximum number of status checks
    #[serde(default = "default_max_checks")]
    pub max_checks: u32,
    /// Consecutive transient failures tolerated before giving up
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Absolute ceiling on a monitor's lifetime in milliseconds
    #[serde(default = "default_cleanup_timeout_ms")]
    pub cleanup_timeout_ms: u64,
    #[serde(default = "default_fallback_policy")]
    pub fallback_policy: FallbackPolicy,
}

/// One contract address book entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractAddressConfig {
    /// Contract kind (e.g. "connector")
    pub kind: String,
    /// Address-book network name (e.g. "bsc-testnet")
    pub network_name: String,
    /// ZetaChain environment ("athens" or "mainnet")
    pub zeta_network: String,
    /// Deployed address (0x-prefixed, 40 hex chars)
    pub address: String,
}

fn default_wallet_timeout_ms() -> u64 {
    300_000
}

fn default_http_timeout_ms() -> u64 {
    30_000
}

fn default_explorer_chain_id() -> u64 {
    ZETACHAIN_CHAIN_ID
}

fn default_interval_ms() -> u64 {
    8_000
}

fn default_max_checks() -> u32 {
    20
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_cleanup_timeout_ms() -> u64 {
    300_000
}

fn default_fallback_policy() -> FallbackPolicy {
    FallbackPolicy::Optimistic
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            request_timeout_ms: default_wallet_timeout_ms(),
        }
    }
}

impl Default for ParseServiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://127.0.0.1:3000/api".to_string(),
            request_timeout_ms: default_http_timeout_ms(),
        }
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_url: "https://zetachain-athens-3.blockscout.com/api".to_string(),
            chain_id: default_explorer_chain_id(),
            request_timeout_ms: default_http_timeout_ms(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_checks: default_max_checks(),
            failure_threshold: default_failure_threshold(),
            cleanup_timeout_ms: default_cleanup_timeout_ms(),
            fallback_policy: default_fallback_policy(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wallet: WalletConfig::default(),
            parse_service: ParseServiceConfig::default(),
            explorer: ExplorerConfig::default(),
            monitor: MonitorConfig::default(),
            contracts: Vec::new(),
        }
    }
}

// ============================================================================
// VALIDATION HELPERS
// ============================================================================

/// Validates an EVM address: 0x prefix followed by 40 hex characters.
///
/// # Arguments
///
/// * `address` - Address string to validate
///
/// # Returns
///
/// * `Ok(())` - Address is well-formed
/// * `Err(String)` - Description of what is wrong
pub fn validate_evm_address(address: &str) -> Result<(), String> {
    let hex_part = address
        .strip_prefix("0x")
        .ok_or_else(|| format!("address {} must start with 0x", address))?;
    if hex_part.len() != 40 {
        return Err(format!(
            "address {} must have 40 hex characters, got {}",
            address,
            hex_part.len()
        ));
    }
    hex::decode(hex_part).map_err(|e| format!("address {} is not valid hex: {}", address, e))?;
    Ok(())
}

/// Rejects the zero address; value sent there is burned.
fn validate_not_zero_address(address: &str) -> Result<(), String> {
    let hex_part = address.strip_prefix("0x").unwrap_or(address);
    if hex_part.bytes().all(|b| b == b'0') {
        return Err(format!(
            "address {} is the zero address, fill in the deployed connector address",
            address
        ));
    }
    Ok(())
}

fn validate_url(field: &str, value: &str) -> anyhow::Result<()> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("Configuration error: {} '{}' is not a valid URL: {}", field, value, e))
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// Path priority: `path` argument > `CROSSCHAT_CONFIG_PATH` env var >
    /// `config/crosschat.toml`.
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to config file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(anyhow::Error)` - File missing, unparseable, or invalid
    pub fn load_from_path(path: Option<&str>) -> anyhow::Result<Self> {
        let config_path = path
            .map(|p| p.to_string())
            .or_else(|| std::env::var("CROSSCHAT_CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/crosschat.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/crosschat.template.toml config/crosschat.toml\n\
                Then edit config/crosschat.toml with your actual values.",
                config_path
            ))
        }
    }

    /// Loads configuration from the default location.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_path(None)
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// Checks:
    /// - Monitor timing values are non-zero and the failure threshold fits the check budget
    /// - Endpoint URLs parse
    /// - Contract addresses are well-formed and keys are unique
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Configuration is valid
    /// * `Err(anyhow::Error)` - Validation failed with error message
    pub fn validate(&self) -> anyhow::Result<()> {
        let monitor = &self.monitor;
        if monitor.interval_ms == 0 {
            anyhow::bail!("Configuration error: monitor.interval_ms must be greater than 0");
        }
        if monitor.max_checks == 0 {
            anyhow::bail!("Configuration error: monitor.max_checks must be greater than 0");
        }
        if monitor.failure_threshold == 0 {
            anyhow::bail!("Configuration error: monitor.failure_threshold must be greater than 0");
        }
        if monitor.failure_threshold > monitor.max_checks {
            anyhow::bail!(
                "Configuration error: monitor.failure_threshold ({}) exceeds monitor.max_checks ({})",
                monitor.failure_threshold,
                monitor.max_checks
            );
        }
        if monitor.cleanup_timeout_ms == 0 {
            anyhow::bail!("Configuration error: monitor.cleanup_timeout_ms must be greater than 0");
        }

        validate_url("wallet.rpc_url", &self.wallet.rpc_url)?;
        validate_url("explorer.api_url", &self.explorer.api_url)?;
        if self.parse_service.enabled {
            validate_url("parse_service.base_url", &self.parse_service.base_url)?;
        }

        let mut seen = HashSet::new();
        for entry in &self.contracts {
            validate_evm_address(&entry.address)
                .and_then(|_| validate_not_zero_address(&entry.address))
                .map_err(|e| {
                    anyhow::anyhow!(
                        "Configuration error: contract {}@{}@{}: {}",
                        entry.kind,
                        entry.network_name,
                        entry.zeta_network,
                        e
                    )
                })?;
            let key = (
                entry.kind.as_str(),
                entry.network_name.as_str(),
                entry.zeta_network.as_str(),
            );
            if !seen.insert(key) {
                anyhow::bail!(
                    "Configuration error: duplicate contract entry {}@{}@{}",
                    entry.kind,
                    entry.network_name,
                    entry.zeta_network
                );
            }
        }

        Ok(())
    }
}
