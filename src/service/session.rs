//! Chat Session
//!
//! Drives one user's flow: text in, [`DisplayEvent`]s out.
//!
//! ```text
//! submit(text) -> parse -> classify -> pending intent
//! confirm()    -> route -> switch chain -> send transaction -> monitor
//! ```
//!
//! Only one transfer can be in flight per session. While `confirm()` is
//! executing, `submit` and `confirm` answer `Busy`. Dropping the `confirm()`
//! future (user cancel) returns the session to idle.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::chains::addresses::StaticAddressBook;
use crate::chains::explorer::BlockscoutClient;
use crate::chains::wallet::WalletProvider;
use crate::config::Config;
use crate::error::{SessionError, WalletError};
use crate::intent::{self, classify, TransferClassification, TransferIntent};
use crate::network::{explorer_tx_url, Network};
use crate::parse_client::ParseServiceClient;
use crate::router::{ExecutionPlan, TransactionRouter};
use crate::service::monitor::{
    MonitorStatus, MonitorSubscription, StatusKind, TransactionMonitor, TransactionRecord,
};
use crate::service::status::{LayeredStatusSource, ReceiptStatusSource, StatusSource};

// ============================================================================
// DISPLAY EVENTS
// ============================================================================

/// Everything the presentation layer may be asked to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayEvent {
    /// Cross-chain intent parsed; awaiting confirmation
    ParsedOk { intent: TransferIntent },
    /// Intent names a network ZetaChain does not support
    UnsupportedWarning {
        intent: TransferIntent,
        networks: Vec<Network>,
    },
    /// Source and destination are the same network
    SameChainWarning { intent: TransferIntent },
    ParseFailed { message: String },
    Busy,
    /// Wallet accepted the transaction
    Submitted {
        tx_hash: String,
        chain_id: u64,
        explorer_url: String,
        note: String,
    },
    Pending {
        tx_hash: String,
        message: String,
        check_count: Option<u32>,
    },
    Confirmed {
        tx_hash: String,
        message: String,
        explorer_url: String,
        block_number: Option<u64>,
        gas_used: Option<u64>,
        confirmations: Option<u64>,
        fallback: bool,
    },
    /// The transfer failed (reverted, rejected or never routed)
    Failed {
        kind: String,
        message: String,
        explorer_url: Option<String>,
    },
    /// Monitoring ended without an answer; the transfer itself may still succeed
    MonitorInconclusive {
        kind: String,
        message: String,
        explorer_url: String,
    },
    Cancelled,
}

impl DisplayEvent {
    fn failed(kind: &str, message: impl Into<String>) -> Self {
        DisplayEvent::Failed {
            kind: kind.to_string(),
            message: message.into(),
            explorer_url: None,
        }
    }
}

impl From<&SessionError> for DisplayEvent {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::Busy => DisplayEvent::Busy,
            SessionError::Parse(e) => DisplayEvent::ParseFailed {
                message: e.to_string(),
            },
            other => DisplayEvent::failed(other.kind(), other.to_string()),
        }
    }
}

impl From<MonitorStatus> for DisplayEvent {
    fn from(status: MonitorStatus) -> Self {
        match status.status {
            StatusKind::Pending => DisplayEvent::Pending {
                tx_hash: status.tx_hash,
                message: status.message,
                check_count: status.check_count,
            },
            StatusKind::Confirmed => DisplayEvent::Confirmed {
                tx_hash: status.tx_hash,
                message: status.message,
                explorer_url: status.explorer_url,
                block_number: status.block_number,
                gas_used: status.gas_used,
                confirmations: status.confirmations,
                fallback: status.fallback,
            },
            StatusKind::Error => DisplayEvent::Failed {
                kind: "transaction_failed".to_string(),
                message: status.message,
                explorer_url: Some(status.explorer_url),
            },
            StatusKind::Timeout => inconclusive("timeout", status),
            StatusKind::NotFound => inconclusive("not_found", status),
            StatusKind::NetworkError => inconclusive("network_error", status),
        }
    }
}

fn inconclusive(kind: &str, status: MonitorStatus) -> DisplayEvent {
    DisplayEvent::MonitorInconclusive {
        kind: kind.to_string(),
        message: status.message,
        explorer_url: status.explorer_url,
    }
}

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    Idle,
    AwaitingConfirmation(TransferIntent),
    Executing,
}

/// A broadcast transfer and the monitor watching it.
#[derive(Debug)]
pub struct Submission {
    pub plan: ExecutionPlan,
    pub record: TransactionRecord,
    /// `DisplayEvent::Submitted`
    pub event: DisplayEvent,
    pub subscription: MonitorSubscription,
}

/// Resets an executing session to idle when dropped.
struct ExecutionGuard<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if *state == SessionState::Executing {
            *state = SessionState::Idle;
        }
    }
}

/// Per-user pipeline state.
pub struct ChatSession {
    wallet: Arc<dyn WalletProvider>,
    router: TransactionRouter,
    monitor: TransactionMonitor,
    parse_service: Option<ParseServiceClient>,
    state: Mutex<SessionState>,
    account: Mutex<Option<String>>,
}

impl ChatSession {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        router: TransactionRouter,
        monitor: TransactionMonitor,
        parse_service: Option<ParseServiceClient>,
    ) -> Self {
        Self {
            wallet,
            router,
            monitor,
            parse_service,
            state: Mutex::new(SessionState::Idle),
            account: Mutex::new(None),
        }
    }

    /// Builds a session from configuration.
    ///
    /// Transactions are monitored through the explorer first and the wallet's
    /// receipts second, so chains the explorer does not index are still
    /// followed.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `wallet` - Wallet provider used for signing and receipts
    ///
    /// # Returns
    ///
    /// * `Ok(ChatSession)` - Session ready to `connect`
    /// * `Err(anyhow::Error)` - Failed to create an HTTP client
    pub fn from_config(config: &Config, wallet: Arc<dyn WalletProvider>) -> anyhow::Result<Self> {
        let explorer: Arc<dyn StatusSource> = Arc::new(BlockscoutClient::new(&config.explorer)?);
        let receipts: Arc<dyn StatusSource> = Arc::new(ReceiptStatusSource::new(wallet.clone()));
        let source = LayeredStatusSource::new(vec![explorer, receipts]);
        let monitor = TransactionMonitor::new(Arc::new(source), config.monitor.clone());

        let router = TransactionRouter::new(Arc::new(StaticAddressBook::from_config(
            &config.contracts,
        )));
        let parse_service = if config.parse_service.enabled {
            Some(ParseServiceClient::new(&config.parse_service)?)
        } else {
            None
        };

        Ok(Self::new(wallet, router, monitor, parse_service))
    }

    /// Reads the wallet's primary account and remembers it for routing.
    pub async fn connect(&self) -> Result<String, SessionError> {
        let accounts = self.wallet.get_accounts().await?;
        let account = accounts
            .into_iter()
            .next()
            .ok_or(SessionError::Wallet(WalletError::NoAccount))?;
        info!("Wallet connected: {}", account);
        *self.account.lock() = Some(account.clone());
        Ok(account)
    }

    pub fn account(&self) -> Option<String> {
        self.account.lock().clone()
    }

    pub fn pending_intent(&self) -> Option<TransferIntent> {
        match &*self.state.lock() {
            SessionState::AwaitingConfirmation(intent) => Some(intent.clone()),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        *self.state.lock() == SessionState::Executing
    }

    pub fn monitor(&self) -> &TransactionMonitor {
        &self.monitor
    }

    /// Parses and classifies a user message.
    ///
    /// The local grammar is tried first; the remote parse service is only
    /// consulted when it is configured and the grammar does not match. A new
    /// message replaces any intent still waiting for confirmation. Only
    /// cross-chain intents are kept for confirmation.
    pub async fn submit(&self, text: &str) -> DisplayEvent {
        if self.is_busy() {
            return DisplayEvent::Busy;
        }

        let intent = match self.parse_text(text).await {
            Ok(intent) => intent,
            Err(message) => {
                info!("Could not parse '{}': {}", text, message);
                *self.state.lock() = SessionState::Idle;
                return DisplayEvent::ParseFailed { message };
            }
        };

        let classification = classify(&intent);
        info!(
            "Intent {} {} {} -> {} classified as {:?}",
            intent.amount, intent.token, intent.from, intent.to, classification
        );

        let mut state = self.state.lock();
        if *state == SessionState::Executing {
            return DisplayEvent::Busy;
        }
        match classification {
            TransferClassification::UnsupportedNetwork => {
                *state = SessionState::Idle;
                DisplayEvent::UnsupportedWarning {
                    networks: intent.unsupported_networks(),
                    intent,
                }
            }
            TransferClassification::SameChainDemo => {
                *state = SessionState::Idle;
                DisplayEvent::SameChainWarning { intent }
            }
            TransferClassification::CrossChain => {
                *state = SessionState::AwaitingConfirmation(intent.clone());
                DisplayEvent::ParsedOk { intent }
            }
        }
    }

    async fn parse_text(&self, text: &str) -> Result<TransferIntent, String> {
        if let Some(intent) = intent::parse(text) {
            return Ok(intent);
        }
        let Some(service) = &self.parse_service else {
            return Err(intent::schema::ParseError::NoMatch.to_string());
        };
        match service.parse(text).await {
            Ok(Ok(intent)) => Ok(intent),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => {
                warn!("Parse service unavailable: {:#}", e);
                Err(format!("Parse service unavailable: {}", e))
            }
        }
    }

    /// Executes the pending intent.
    ///
    /// Routing happens before any wallet call, so an unroutable intent never
    /// reaches the wallet. Wallet failures leave no transaction record behind.
    ///
    /// # Returns
    ///
    /// * `Ok(Submission)` - Transaction broadcast and monitor started
    /// * `Err(SessionError)` - Nothing pending, busy, routing or wallet failure
    pub async fn confirm(&self) -> Result<Submission, SessionError> {
        let account = self.account().ok_or(SessionError::NotConnected)?;

        let intent = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, SessionState::Executing) {
                SessionState::AwaitingConfirmation(intent) => intent,
                SessionState::Executing => return Err(SessionError::Busy),
                SessionState::Idle => {
                    *state = SessionState::Idle;
                    return Err(SessionError::NothingPending);
                }
            }
        };
        let _guard = ExecutionGuard { state: &self.state };

        let plan = self.router.route(&intent, &account).map_err(|e| {
            warn!("Routing failed: {}", e);
            SessionError::from(e)
        })?;

        self.wallet
            .switch_chain(plan.source_chain_id)
            .await
            .map_err(|e| wallet_failure("switch chain", e))?;

        let tx_hash = self
            .wallet
            .send_transaction(&plan.transaction_request())
            .await
            .map_err(|e| wallet_failure("send transaction", e))?;
        info!("Transaction submitted: {}", tx_hash);

        let record = TransactionRecord {
            hash: tx_hash.clone(),
            chain_id: plan.source_chain_id,
        };
        let subscription = self.monitor.watch(record.clone());
        let event = DisplayEvent::Submitted {
            explorer_url: explorer_tx_url(record.chain_id, &tx_hash),
            chain_id: record.chain_id,
            note: plan.note(),
            tx_hash,
        };

        Ok(Submission {
            plan,
            record,
            event,
            subscription,
        })
    }

    /// Drops the pending intent.
    pub fn cancel(&self) -> DisplayEvent {
        let mut state = self.state.lock();
        if *state == SessionState::Executing {
            return DisplayEvent::Busy;
        }
        *state = SessionState::Idle;
        DisplayEvent::Cancelled
    }
}

fn wallet_failure(step: &str, err: WalletError) -> SessionError {
    match &err {
        WalletError::UserRejected => warn!("Wallet {} rejected by user", step),
        _ => error!("Wallet {} failed: {}", step, err),
    }
    SessionError::Wallet(err)
}
