//! Transaction Monitor
//!
//! Polls a [`StatusSource`] for a submitted transaction until it reaches a
//! terminal state, emitting [`MonitorStatus`] events on a channel.
//!
//! States: `Polling` (initial) and the terminal `Confirmed`, `Errored`,
//! `TimedOut`, `NotFound`, `NetworkError`.
//!
//! Failure policy: once the wallet has accepted a transaction, repeated failure
//! of the *monitoring* source is treated as a monitoring outage. With
//! [`FallbackPolicy::Optimistic`] the monitor then reports a confirmation marked
//! `fallback = true`; with [`FallbackPolicy::Strict`] it reports
//! `network_error` (failures) or `timeout` (check budget exhausted).
//!
//! The tick schedule is injected through [`Ticker`] so tests can drive checks
//! one at a time. At most one monitor runs per transaction hash.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{FallbackPolicy, MonitorConfig};
use crate::network::explorer_tx_url;
use crate::service::status::{StatusReport, StatusSource};

pub use crate::service::status::TransactionRecord;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Monitor state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorState {
    Polling,
    Confirmed,
    Errored,
    TimedOut,
    NotFound,
    NetworkError,
}

impl MonitorState {
    pub fn is_terminal(&self) -> bool {
        *self != MonitorState::Polling
    }
}

/// Status value carried by each emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Pending,
    Confirmed,
    Error,
    Timeout,
    NotFound,
    NetworkError,
}

impl From<MonitorState> for StatusKind {
    fn from(state: MonitorState) -> Self {
        match state {
            MonitorState::Polling => StatusKind::Pending,
            MonitorState::Confirmed => StatusKind::Confirmed,
            MonitorState::Errored => StatusKind::Error,
            MonitorState::TimedOut => StatusKind::Timeout,
            MonitorState::NotFound => StatusKind::NotFound,
            MonitorState::NetworkError => StatusKind::NetworkError,
        }
    }
}

/// Event emitted on every state change (and on every pending check).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub status: StatusKind,
    pub tx_hash: String,
    pub message: String,
    pub explorer_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_count: Option<u32>,
    /// Success asserted without positive confirmation
    #[serde(default)]
    pub fallback: bool,
}

// ============================================================================
// STATE MACHINE
// ============================================================================

/// Pure monitor state machine; one instance per monitored transaction.
#[derive(Debug, Clone)]
pub struct MonitorCore {
    record: TransactionRecord,
    max_checks: u32,
    failure_threshold: u32,
    policy: FallbackPolicy,
    state: MonitorState,
    check_count: u32,
    consecutive_failures: u32,
}

impl MonitorCore {
    pub fn new(record: TransactionRecord, config: &MonitorConfig) -> Self {
        Self {
            record,
            max_checks: config.max_checks,
            failure_threshold: config.failure_threshold,
            policy: config.fallback_policy,
            state: MonitorState::Polling,
            check_count: 0,
            consecutive_failures: 0,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn check_count(&self) -> u32 {
        self.check_count
    }

    pub fn record(&self) -> &TransactionRecord {
        &self.record
    }

    fn status(&self, status: StatusKind, message: impl Into<String>) -> MonitorStatus {
        MonitorStatus {
            status,
            tx_hash: self.record.hash.clone(),
            message: message.into(),
            explorer_url: explorer_tx_url(self.record.chain_id, &self.record.hash),
            confirmations: None,
            block_number: None,
            gas_used: None,
            check_count: None,
            fallback: false,
        }
    }

    fn finish(&mut self, state: MonitorState, mut status: MonitorStatus) -> Option<MonitorStatus> {
        self.state = state;
        status.status = state.into();
        info!(
            "Monitor {} -> {:?} after {} check(s){}",
            self.record.hash,
            state,
            self.check_count,
            if status.fallback { " (fallback)" } else { "" }
        );
        Some(status)
    }

    fn fallback_confirmation(&mut self, message: &str) -> Option<MonitorStatus> {
        let mut status = self.status(StatusKind::Confirmed, message);
        status.fallback = true;
        status.confirmations = Some(1);
        self.finish(MonitorState::Confirmed, status)
    }

    /// Applies one status check outcome.
    ///
    /// # Arguments
    ///
    /// * `outcome` - Result of asking the status source
    ///
    /// # Returns
    ///
    /// * `Some(MonitorStatus)` - Event to emit (pending update or terminal status)
    /// * `None` - Nothing to report (transient failure below the threshold, or already terminal)
    pub fn on_check(&mut self, outcome: Result<StatusReport>) -> Option<MonitorStatus> {
        if self.state.is_terminal() {
            return None;
        }
        self.check_count += 1;

        match outcome {
            Ok(StatusReport::Success {
                block_number,
                gas_used,
                confirmations,
            }) => {
                let mut status = self.status(StatusKind::Confirmed, "Transaction confirmed");
                status.block_number = Some(block_number);
                status.gas_used = Some(gas_used);
                status.confirmations = confirmations;
                return self.finish(MonitorState::Confirmed, status);
            }
            Ok(StatusReport::Failed { message }) => {
                let status = self.status(StatusKind::Error, message);
                return self.finish(MonitorState::Errored, status);
            }
            Ok(StatusReport::NotFound) => {
                let status = self.status(
                    StatusKind::NotFound,
                    "Transaction not found, please check the transaction hash",
                );
                return self.finish(MonitorState::NotFound, status);
            }
            Ok(StatusReport::Pending) => {
                self.consecutive_failures = 0;
            }
            Ok(StatusReport::Ambiguous(reason)) => {
                if let Some(status) = self.on_transient_failure(&reason) {
                    return Some(status);
                }
            }
            Err(e) => {
                if let Some(status) = self.on_transient_failure(&format!("{:#}", e)) {
                    return Some(status);
                }
            }
        }

        if self.check_count >= self.max_checks {
            return match self.policy {
                FallbackPolicy::Optimistic => self.fallback_confirmation(
                    "Transaction submitted (accepted by wallet); check budget exhausted, please verify in the explorer",
                ),
                FallbackPolicy::Strict => {
                    let status = self.status(
                        StatusKind::Timeout,
                        "No final status after the maximum number of checks",
                    );
                    self.finish(MonitorState::TimedOut, status)
                }
            };
        }

        if self.consecutive_failures > 0 {
            return None;
        }
        let mut status = self.status(
            StatusKind::Pending,
            format!("Transaction submitted, check #{}...", self.check_count),
        );
        status.check_count = Some(self.check_count);
        Some(status)
    }

    fn on_transient_failure(&mut self, reason: &str) -> Option<MonitorStatus> {
        self.consecutive_failures += 1;
        warn!(
            "Status check #{} for {} failed ({}/{}): {}",
            self.check_count, self.record.hash, self.consecutive_failures, self.failure_threshold, reason
        );
        if self.consecutive_failures < self.failure_threshold {
            return None;
        }
        match self.policy {
            FallbackPolicy::Optimistic => self.fallback_confirmation(
                "Transaction submitted (accepted by wallet); explorer status checks failed",
            ),
            FallbackPolicy::Strict => {
                let status = self.status(
                    StatusKind::NetworkError,
                    format!("Status checks keep failing: {}", reason),
                );
                self.finish(MonitorState::NetworkError, status)
            }
        }
    }

    /// Applies the absolute lifetime ceiling.
    pub fn on_ceiling(&mut self) -> Option<MonitorStatus> {
        if self.state.is_terminal() {
            return None;
        }
        let status = self.status(
            StatusKind::Timeout,
            "Monitoring stopped after the cleanup timeout, please verify in the explorer",
        );
        self.finish(MonitorState::TimedOut, status)
    }
}

// ============================================================================
// TICKERS
// ============================================================================

/// Source of monitor ticks.
#[async_trait]
pub trait Ticker: Send {
    /// Resolves when the next check is due.
    async fn tick(&mut self);
}

/// Fixed-interval ticker on the tokio clock. The first tick fires one period
/// after creation.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Ticker driven explicitly through a [`TickHandle`].
pub struct ManualTicker {
    rx: mpsc::Receiver<()>,
}

/// Sends ticks to a [`ManualTicker`].
#[derive(Clone)]
pub struct TickHandle {
    tx: mpsc::Sender<()>,
}

impl ManualTicker {
    pub fn new() -> (Self, TickHandle) {
        let (tx, rx) = mpsc::channel(1);
        (Self { rx }, TickHandle { tx })
    }
}

impl TickHandle {
    /// Fires one tick. Returns false once the monitor has stopped listening.
    pub async fn tick(&self) -> bool {
        self.tx.send(()).await.is_ok()
    }
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) {
        if self.rx.recv().await.is_none() {
            // all handles dropped: never tick again
            std::future::pending::<()>().await;
        }
    }
}

// ============================================================================
// MONITOR
// ============================================================================

struct ActiveMonitor {
    id: u64,
    token: CancellationToken,
}

/// Receives the events of one monitored transaction.
pub struct MonitorSubscription {
    pub record: TransactionRecord,
    events: mpsc::UnboundedReceiver<MonitorStatus>,
    handle: JoinHandle<MonitorState>,
}

impl std::fmt::Debug for MonitorSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorSubscription")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl MonitorSubscription {
    /// Next event, or `None` once the monitor has stopped.
    pub async fn next(&mut self) -> Option<MonitorStatus> {
        self.events.recv().await
    }

    /// Waits for the monitor task to end and returns its final state.
    pub async fn join(self) -> Result<MonitorState> {
        Ok(self.handle.await?)
    }

    /// Drains all remaining events and returns the last one.
    pub async fn last(mut self) -> Option<MonitorStatus> {
        let mut last = None;
        while let Some(status) = self.events.recv().await {
            last = Some(status);
        }
        last
    }
}

/// Runs one monitor task per transaction hash.
#[derive(Clone)]
pub struct TransactionMonitor {
    source: Arc<dyn StatusSource>,
    config: MonitorConfig,
    active: Arc<Mutex<HashMap<String, ActiveMonitor>>>,
    next_id: Arc<AtomicU64>,
}

impl TransactionMonitor {
    pub fn new(source: Arc<dyn StatusSource>, config: MonitorConfig) -> Self {
        Self {
            source,
            config,
            active: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Starts monitoring on the configured interval.
    pub fn watch(&self, record: TransactionRecord) -> MonitorSubscription {
        let ticker = IntervalTicker::new(Duration::from_millis(self.config.interval_ms));
        self.watch_with_ticker(record, ticker)
    }

    /// Starts monitoring with an explicit tick source.
    ///
    /// A monitor already running for the same hash is cancelled first.
    pub fn watch_with_ticker<T: Ticker + 'static>(
        &self,
        record: TransactionRecord,
        ticker: T,
    ) -> MonitorSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        {
            let mut active = self.active.lock();
            if let Some(previous) = active.insert(
                record.hash.clone(),
                ActiveMonitor {
                    id,
                    token: token.clone(),
                },
            ) {
                info!("Replacing existing monitor for {}", record.hash);
                previous.token.cancel();
            }
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let core = MonitorCore::new(record.clone(), &self.config);
        let source = self.source.clone();
        let ceiling = Duration::from_millis(self.config.cleanup_timeout_ms);
        let active = self.active.clone();
        let hash = record.hash.clone();

        info!(
            "Monitoring {} on chain {} (every {}ms, max {} checks)",
            record.hash, record.chain_id, self.config.interval_ms, self.config.max_checks
        );

        let handle = tokio::spawn(async move {
            let state = run_monitor(core, ticker, source, tx, token, ceiling).await;
            let mut active = active.lock();
            if active.get(&hash).map(|m| m.id) == Some(id) {
                active.remove(&hash);
            }
            state
        });

        MonitorSubscription {
            record,
            events: rx,
            handle,
        }
    }

    /// Stops the monitor for `hash` without emitting an event.
    pub fn cancel(&self, hash: &str) -> bool {
        match self.active.lock().remove(hash) {
            Some(monitor) => {
                info!("Cancelled monitor for {}", hash);
                monitor.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Stops every running monitor.
    pub fn cancel_all(&self) {
        for (_, monitor) in self.active.lock().drain() {
            monitor.token.cancel();
        }
    }

    pub fn is_active(&self, hash: &str) -> bool {
        self.active.lock().contains_key(hash)
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }
}

async fn run_monitor<T: Ticker>(
    mut core: MonitorCore,
    mut ticker: T,
    source: Arc<dyn StatusSource>,
    tx: mpsc::UnboundedSender<MonitorStatus>,
    token: CancellationToken,
    ceiling: Duration,
) -> MonitorState {
    let deadline = tokio::time::sleep(ceiling);
    tokio::pin!(deadline);
    let record = core.record().clone();
    let hash = record.hash.clone();

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return core.state(),
            _ = &mut deadline => {
                if let Some(status) = core.on_ceiling() {
                    let _ = tx.send(status);
                }
                return core.state();
            }
            _ = ticker.tick() => {}
        }

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => return core.state(),
            _ = &mut deadline => {
                if let Some(status) = core.on_ceiling() {
                    let _ = tx.send(status);
                }
                return core.state();
            }
            outcome = source.check(&record) => outcome,
        };

        debug!("Check #{} for {} via {}", core.check_count() + 1, hash, source.name());
        if let Some(status) = core.on_check(outcome) {
            // receiver may be gone; the monitor still runs to a terminal state
            let _ = tx.send(status);
        }
        if core.state().is_terminal() {
            return core.state();
        }
    }
}
