//! Unit tests for remote parse-service payload validation

use crosschat::intent::schema::{
    is_positive_amount, validate_remote_intent, ParseError, RemoteAmount, RemoteIntent,
};
use crosschat::network::Network;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn remote(action: &str, amount: RemoteAmount, from: &str, to: &str) -> RemoteIntent {
    RemoteIntent {
        action: action.to_string(),
        token: "eth".to_string(),
        amount,
        from: from.to_string(),
        to: to.to_string(),
    }
}

// ============================================================================
// VALIDATION TESTS
// ============================================================================

/// What is tested: a well-formed payload becomes a TransferIntent
/// Why: This is the happy path of the remote parse service
#[test]
fn test_validate_remote_intent_ok() {
    let intent = validate_remote_intent(remote(
        "transfer",
        RemoteAmount::Text("0.01".to_string()),
        "zetachain",
        "bscTestnet",
    ))
    .unwrap();
    assert_eq!(intent.token, "ETH");
    assert_eq!(intent.amount, "0.01");
    assert_eq!(intent.from, Network::ZetaChain);
    assert_eq!(intent.to, Network::BscTestnet);
}

/// What is tested: numeric amounts are accepted
/// Why: Models sometimes emit bare numbers instead of strings
#[test]
fn test_validate_numeric_amount() {
    let intent = validate_remote_intent(remote(
        "transfer",
        RemoteAmount::Number(0.5),
        "bsc",
        "zetachain",
    ))
    .unwrap();
    assert_eq!(intent.amount, "0.5");
}

/// What is tested: actions other than transfer are rejected
/// Why: Only transfers are implemented
#[test]
fn test_validate_rejects_other_actions() {
    let err = validate_remote_intent(remote(
        "swap",
        RemoteAmount::Text("1".to_string()),
        "bsc",
        "zetachain",
    ))
    .unwrap_err();
    assert_eq!(err, ParseError::UnsupportedAction("swap".to_string()));
    assert_eq!(err.kind(), "parse_failure");
}

/// What is tested: the action must be exactly "transfer"
/// Why: The service emits canonical payloads; anything else is not trusted
#[test]
fn test_validate_action_is_exact() {
    for action in ["Transfer", " transfer ", "TRANSFER"] {
        let err = validate_remote_intent(remote(
            action,
            RemoteAmount::Text("1".to_string()),
            "bsc",
            "zetachain",
        ))
        .unwrap_err();
        assert_eq!(err, ParseError::UnsupportedAction(action.to_string()));
    }
}

/// What is tested: zero, negative and non-numeric amounts are rejected
/// Why: The amount must be a positive finite number
#[test]
fn test_validate_rejects_bad_amounts() {
    for amount in ["0", "-1", "abc", "NaN", "inf"] {
        let err = validate_remote_intent(remote(
            "transfer",
            RemoteAmount::Text(amount.to_string()),
            "bsc",
            "zetachain",
        ))
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidAmount(_)), "amount {}", amount);
    }
}

/// What is tested: user-facing aliases are not accepted on the remote path
/// Why: The remote service is expected to emit canonical ids only
#[test]
fn test_validate_rejects_aliases() {
    let err = validate_remote_intent(remote(
        "transfer",
        RemoteAmount::Text("1".to_string()),
        "BSC Testnet",
        "zetachain",
    ))
    .unwrap_err();
    assert_eq!(err, ParseError::UnknownNetwork("BSC Testnet".to_string()));
}

/// What is tested: unsupported canonical networks are flagged, not rejected
/// Why: Same contract as the text grammar
#[test]
fn test_validate_flags_unsupported() {
    let intent = validate_remote_intent(remote(
        "transfer",
        RemoteAmount::Text("1".to_string()),
        "sepolia",
        "zetachain",
    ))
    .unwrap();
    assert!(intent.has_unsupported_network);
}

/// What is tested: an empty token is rejected
/// Why: A transfer needs an asset
#[test]
fn test_validate_rejects_missing_token() {
    let mut payload = remote("transfer", RemoteAmount::Text("1".to_string()), "bsc", "zetachain");
    payload.token = "  ".to_string();
    assert_eq!(validate_remote_intent(payload).unwrap_err(), ParseError::MissingToken);
}

// ============================================================================
// PAYLOAD SHAPE TESTS
// ============================================================================

/// What is tested: fromChain/toChain spellings deserialize into from/to
/// Why: Older prompts used these field names
#[test]
fn test_remote_intent_accepts_legacy_field_names() {
    let payload: RemoteIntent = serde_json::from_str(
        r#"{"action":"transfer","token":"ETH","amount":"0.2","fromChain":"polygonMumbai","toChain":"zetachain"}"#,
    )
    .unwrap();
    assert_eq!(payload.from, "polygonMumbai");
    assert_eq!(payload.to, "zetachain");
    assert_eq!(payload.amount, RemoteAmount::Text("0.2".to_string()));
}

/// What is tested: is_positive_amount() edge cases
/// Why: Shared by the schema validator and the router
#[test]
fn test_is_positive_amount() {
    assert!(is_positive_amount("0.000001"));
    assert!(is_positive_amount(" 3 "));
    assert!(!is_positive_amount("0"));
    assert!(!is_positive_amount(""));
    assert!(!is_positive_amount("-0.1"));
}
