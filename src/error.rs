//! Error taxonomy
//!
//! Each pipeline stage has its own error enum; [`SessionError`] wraps them for
//! the session layer. Every error exposes a stable `kind()` string so the
//! presentation layer can pick a message template without string matching.

use thiserror::Error;

pub use crate::chains::addresses::AddressLookupError;
pub use crate::chains::wallet::WalletError;
pub use crate::intent::schema::ParseError;
pub use crate::router::RouteError;

/// Session-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No transfer is waiting for confirmation")]
    NothingPending,

    #[error("A transfer is already executing")]
    Busy,

    #[error("Wallet is not connected")]
    NotConnected,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl SessionError {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::NothingPending => "nothing_pending",
            SessionError::Busy => "busy",
            SessionError::NotConnected => "not_connected",
            SessionError::Parse(e) => e.kind(),
            SessionError::Route(e) => e.kind(),
            SessionError::Wallet(e) => e.kind(),
        }
    }
}
