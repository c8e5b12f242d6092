//! Remote parse-service payload validation
//!
//! The remote parse service is expected to answer with canonical network
//! identifiers in a fixed JSON shape. On this path the parser degenerates to a
//! schema check: the action must be "transfer", the amount must be a positive
//! finite number, and both networks must be canonical identifiers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::TransferIntent;
use crate::network::Network;

/// Why a remote payload could not become a [`TransferIntent`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Instruction not understood")]
    NoMatch,

    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Missing token symbol")]
    MissingToken,

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Parse service returned an error: {error}")]
    Upstream {
        error: String,
        raw: Option<String>,
    },
}

impl ParseError {
    /// Machine-readable kind, shared by every parse failure.
    pub fn kind(&self) -> &'static str {
        "parse_failure"
    }
}

/// Amount as emitted by the model: usually a string, sometimes a bare number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteAmount {
    Text(String),
    Number(f64),
}

impl RemoteAmount {
    fn into_string(self) -> String {
        match self {
            RemoteAmount::Text(s) => s.trim().to_string(),
            RemoteAmount::Number(n) => n.to_string(),
        }
    }
}

/// Transfer payload returned by the remote parse service.
///
/// Older prompts emitted `fromChain`/`toChain`; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteIntent {
    pub action: String,
    #[serde(default)]
    pub token: String,
    pub amount: RemoteAmount,
    #[serde(alias = "fromChain")]
    pub from: String,
    #[serde(alias = "toChain")]
    pub to: String,
}

/// Returns true if `amount` parses as a finite number greater than zero.
pub fn is_positive_amount(amount: &str) -> bool {
    amount
        .trim()
        .parse::<f64>()
        .map(|v| v.is_finite() && v > 0.0)
        .unwrap_or(false)
}

/// Validates a remote payload and converts it into a [`TransferIntent`].
///
/// # Arguments
///
/// * `remote` - Payload as decoded from the parse service
///
/// # Returns
///
/// * `Ok(TransferIntent)` - Payload is well-formed; unsupported networks are flagged, not rejected
/// * `Err(ParseError)` - Action, amount, token or network failed validation
pub fn validate_remote_intent(remote: RemoteIntent) -> Result<TransferIntent, ParseError> {
    if remote.action != "transfer" {
        return Err(ParseError::UnsupportedAction(remote.action));
    }

    let amount = remote.amount.into_string();
    if !is_positive_amount(&amount) {
        return Err(ParseError::InvalidAmount(amount));
    }

    if remote.token.trim().is_empty() {
        return Err(ParseError::MissingToken);
    }

    let from = Network::from_canonical(&remote.from)
        .ok_or_else(|| ParseError::UnknownNetwork(remote.from.clone()))?;
    let to = Network::from_canonical(&remote.to)
        .ok_or_else(|| ParseError::UnknownNetwork(remote.to.clone()))?;

    Ok(TransferIntent::transfer(amount, &remote.token, from, to))
}
