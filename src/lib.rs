//! Crosschat
//!
//! Turns natural-language transfer instructions ("转 0.01 ETH 从 ZetaChain 到 BSC Testnet",
//! "send 0.5 ETH from ethereum to zetachain") into routed ZetaChain connector
//! transactions, broadcasts them through a wallet provider and monitors them
//! until they reach a terminal state.

pub mod chains;
pub mod config;
pub mod error;
pub mod intent;
pub mod network;
pub mod parse_client;
pub mod router;
pub mod service;

pub use config::Config;
pub use error::SessionError;
pub use intent::{classify, parse, TransferClassification, TransferIntent};
pub use network::Network;
pub use router::{ExecutionPlan, RouteError, RouteKind, TransactionRouter};
pub use service::{ChatSession, DisplayEvent, TransactionMonitor};
