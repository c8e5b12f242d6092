//! Unit tests for status sources

use crosschat::chains::wallet::TransactionReceipt;
use crosschat::service::status::{
    LayeredStatusSource, ReceiptStatusSource, StatusReport, StatusSource, TransactionRecord,
};
use std::sync::Arc;

#[path = "helpers.rs"]
mod test_helpers;
use test_helpers::{success_report, MockWallet, ScriptedStatusSource, DUMMY_TX_HASH};

fn record_on(chain_id: u64) -> TransactionRecord {
    TransactionRecord {
        hash: DUMMY_TX_HASH.to_string(),
        chain_id,
    }
}

// ============================================================================
// RECEIPT SOURCE TESTS
// ============================================================================

/// What is tested: no receipt yet means Pending; the lookup uses the record's chain
/// Why: Unmined transactions have no receipt, and receipts only exist on the broadcast chain
#[tokio::test]
async fn test_receipt_source_pending() {
    let wallet = Arc::new(MockWallet::default());
    let source = ReceiptStatusSource::new(wallet.clone());

    assert_eq!(source.check(&record_on(97)).await.unwrap(), StatusReport::Pending);
    assert_eq!(wallet.calls(), vec!["get_transaction_receipt:97".to_string()]);
}

/// What is tested: successful and reverted receipts
/// Why: Receipt status 0x1 is the only success signal
#[tokio::test]
async fn test_receipt_source_mined() {
    let receipt = TransactionReceipt {
        transaction_hash: DUMMY_TX_HASH.to_string(),
        block_number: 42,
        gas_used: 21000,
        success: true,
    };
    let wallet = Arc::new(MockWallet {
        receipt: Some(receipt.clone()),
        ..MockWallet::default()
    });
    let source = ReceiptStatusSource::new(wallet);
    assert_eq!(
        source.check(&record_on(7001)).await.unwrap(),
        StatusReport::Success {
            block_number: 42,
            gas_used: 21000,
            confirmations: None,
        }
    );

    let wallet = Arc::new(MockWallet {
        receipt: Some(TransactionReceipt {
            success: false,
            ..receipt
        }),
        ..MockWallet::default()
    });
    let source = ReceiptStatusSource::new(wallet);
    assert!(matches!(
        source.check(&record_on(7001)).await.unwrap(),
        StatusReport::Failed { .. }
    ));
}

// ============================================================================
// LAYERED SOURCE TESTS
// ============================================================================

/// What is tested: the first definitive answer wins and later sources are skipped
/// Why: The explorer is authoritative when it answers
#[tokio::test]
async fn test_layered_first_definitive_wins() {
    let first = Arc::new(ScriptedStatusSource::always(success_report()));
    let second = Arc::new(ScriptedStatusSource::always(StatusReport::Pending));
    let layered = LayeredStatusSource::new(vec![first.clone() as Arc<dyn StatusSource>, second.clone() as Arc<dyn StatusSource>]);

    assert_eq!(layered.check(&record_on(7001)).await.unwrap(), success_report());
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 0);
}

/// What is tested: a failing first source falls through to the next
/// Why: The receipt source backs up an unreachable explorer
#[tokio::test]
async fn test_layered_falls_through_errors() {
    let first = Arc::new(ScriptedStatusSource::always_failing());
    let second = Arc::new(ScriptedStatusSource::always(StatusReport::Pending));
    let layered = LayeredStatusSource::new(vec![first as Arc<dyn StatusSource>, second as Arc<dyn StatusSource>]);

    assert_eq!(layered.check(&record_on(7001)).await.unwrap(), StatusReport::Pending);
}

/// What is tested: ambiguous answers are returned only when nothing better exists
/// Why: An ambiguous answer is still preferred over an error
#[tokio::test]
async fn test_layered_ambiguous_and_errors() {
    let ambiguous = Arc::new(ScriptedStatusSource::always(StatusReport::Ambiguous(
        "rate limited".to_string(),
    )));
    let failing = Arc::new(ScriptedStatusSource::always_failing());
    let layered = LayeredStatusSource::new(vec![ambiguous as Arc<dyn StatusSource>, failing.clone() as Arc<dyn StatusSource>]);
    assert_eq!(
        layered.check(&record_on(7001)).await.unwrap(),
        StatusReport::Ambiguous("rate limited".to_string())
    );

    let layered = LayeredStatusSource::new(vec![failing.clone() as Arc<dyn StatusSource>, failing as Arc<dyn StatusSource>]);
    assert!(layered.check(&record_on(7001)).await.is_err());
}

/// What is tested: an empty layered source is ambiguous
/// Why: Misconfiguration must degrade to a transient failure, not a panic
#[tokio::test]
async fn test_layered_empty() {
    let layered = LayeredStatusSource::new(vec![]);
    assert!(matches!(
        layered.check(&record_on(7001)).await.unwrap(),
        StatusReport::Ambiguous(_)
    ));
}
