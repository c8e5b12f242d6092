//! Text grammar for transfer instructions
//!
//! Accepted forms (case-insensitive):
//!
//! ```text
//! 转 <amount> <TOKEN> 从 <network> 到 <network>
//! transfer|send <amount> <TOKEN> from <network> to <network>
//! ```
//!
//! `<amount>` is `[0-9]+(\.[0-9]+)?`, `<TOKEN>` is one or more Latin letters and
//! each `<network>` may contain spaces ("BSC Testnet"). Both network phrases must
//! resolve through the registry or the whole parse fails. A resolved network in
//! the deny-list does not fail the parse; it sets `has_unsupported_network`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use super::TransferIntent;
use crate::network;

static CHINESE_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)转\s+([0-9]+(?:\.[0-9]+)?)\s+([A-Z]+)\s+从\s+(.+?)\s+到\s+(.+?)\s*$")
        .expect("static grammar is valid")
});

static ENGLISH_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:transfer|send)\s+([0-9]+(?:\.[0-9]+)?)\s+([A-Z]+)\s+from\s+(.+?)\s+to\s+(.+?)\s*$",
    )
    .expect("static grammar is valid")
});

/// Parses a free-text instruction into a transfer intent.
///
/// # Arguments
///
/// * `text` - Instruction as typed by the user
///
/// # Returns
///
/// * `Some(TransferIntent)` - Grammar matched and both networks resolved
/// * `None` - Grammar did not match, or a network phrase is not recognized
pub fn parse(text: &str) -> Option<TransferIntent> {
    let caps = CHINESE_GRAMMAR
        .captures(text)
        .or_else(|| ENGLISH_GRAMMAR.captures(text));

    let Some(caps) = caps else {
        debug!("Instruction does not match transfer grammar: {:?}", text);
        return None;
    };

    let intent = from_captures(&caps)?;
    if intent.has_unsupported_network {
        warn!(
            "Parsed transfer references unsupported network: {} -> {}",
            intent.from, intent.to
        );
    } else {
        debug!("Parsed transfer: {:?}", intent);
    }
    Some(intent)
}

fn from_captures(caps: &Captures<'_>) -> Option<TransferIntent> {
    let amount = &caps[1];
    let token = &caps[2];
    let from_phrase = &caps[3];
    let to_phrase = &caps[4];

    let from = network::normalize(from_phrase);
    let to = network::normalize(to_phrase);
    match (from, to) {
        (Some(from), Some(to)) => Some(TransferIntent::transfer(amount, token, from, to)),
        _ => {
            debug!(
                "Unrecognized network name(s): from={:?} to={:?}",
                from_phrase, to_phrase
            );
            None
        }
    }
}
