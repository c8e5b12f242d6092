//! Unit tests for the remote parse service client

use crosschat::config::ParseServiceConfig;
use crosschat::intent::schema::ParseError;
use crosschat::network::Network;
use crosschat::parse_client::ParseServiceClient;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn client_for(server: &MockServer) -> ParseServiceClient {
    ParseServiceClient::new(&ParseServiceConfig {
        enabled: true,
        base_url: format!("{}/api/", server.uri()),
        request_timeout_ms: 5_000,
    })
    .unwrap()
}

async fn mount_parse(server: &MockServer, message: &str, response: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/parse"))
        .and(body_json(json!({ "message": message })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}

// ============================================================================
// PARSE TESTS
// ============================================================================

/// What is tested: a valid payload becomes a TransferIntent
/// Why: The service is the fallback for free-form instructions
#[tokio::test]
async fn test_parse_service_intent() {
    let server = MockServer::start().await;
    mount_parse(
        &server,
        "please move a hundredth of an ether from zeta to bsc testnet",
        json!({
            "action": "transfer",
            "token": "ETH",
            "amount": "0.01",
            "fromChain": "zetachain",
            "toChain": "bscTestnet"
        }),
    )
    .await;

    let intent = client_for(&server)
        .parse("please move a hundredth of an ether from zeta to bsc testnet")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(intent.from, Network::ZetaChain);
    assert_eq!(intent.to, Network::BscTestnet);
    assert_eq!(intent.amount, "0.01");
}

/// What is tested: an {error, raw} answer maps to ParseError::Upstream
/// Why: Model output the service could not decode is a parse failure, not a transport error
#[tokio::test]
async fn test_parse_service_error_payload() {
    let server = MockServer::start().await;
    mount_parse(
        &server,
        "what's the weather",
        json!({ "error": "Could not parse model output", "raw": "I am not sure" }),
    )
    .await;

    let err = client_for(&server)
        .parse("what's the weather")
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(
        err,
        ParseError::Upstream {
            error: "Could not parse model output".to_string(),
            raw: Some("I am not sure".to_string()),
        }
    );
}

/// What is tested: payloads failing validation are reported as ParseError
/// Why: The remote path applies the same schema rules as local validation
#[tokio::test]
async fn test_parse_service_invalid_payload() {
    let server = MockServer::start().await;
    mount_parse(
        &server,
        "send zero",
        json!({
            "action": "transfer",
            "token": "ETH",
            "amount": "0",
            "from": "bsc",
            "to": "zetachain"
        }),
    )
    .await;

    let err = client_for(&server).parse("send zero").await.unwrap().unwrap_err();
    assert!(matches!(err, ParseError::InvalidAmount(_)));
}

/// What is tested: an unrecognizable JSON shape maps to NoMatch
/// Why: Unexpected shapes must not crash the session
#[tokio::test]
async fn test_parse_service_unknown_shape() {
    let server = MockServer::start().await;
    mount_parse(&server, "hi", json!({ "reply": "hello!" })).await;

    let err = client_for(&server).parse("hi").await.unwrap().unwrap_err();
    assert_eq!(err, ParseError::NoMatch);
}

/// What is tested: HTTP failures surface as the outer error
/// Why: An unavailable service is distinct from a parse failure
#[tokio::test]
async fn test_parse_service_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/parse"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(client_for(&server).parse("anything").await.is_err());
}
