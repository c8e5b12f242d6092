//! Remote Parse Service Client
//!
//! HTTP client for the language-model parse service used when the local grammar
//! does not recognise an instruction. The service answers either with an
//! intent payload (`{action, token, amount, fromChain, toChain}`) or with an
//! error object (`{error, raw}`).

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ParseServiceConfig;
use crate::intent::schema::{validate_remote_intent, ParseError, RemoteIntent};
use crate::intent::TransferIntent;

/// Request body for `POST {base_url}/parse`.
#[derive(Debug, Serialize)]
struct ParseRequest<'a> {
    message: &'a str,
}

/// Error object returned by the service when the model output is unusable.
#[derive(Debug, Deserialize)]
struct ParseServiceError {
    error: String,
    #[serde(default)]
    raw: Option<String>,
}

/// Any of the payloads the service may answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParseResponse {
    Error(ParseServiceError),
    Intent(RemoteIntent),
}

/// Client for the remote parse service.
pub struct ParseServiceClient {
    client: Client,
    base_url: String,
}

impl ParseServiceClient {
    /// Creates a new parse service client.
    ///
    /// # Arguments
    ///
    /// * `config` - Parse service configuration (base URL and timeout)
    ///
    /// # Returns
    ///
    /// * `Ok(ParseServiceClient)` - Successfully created client
    /// * `Err(anyhow::Error)` - Failed to create HTTP client
    pub fn new(config: &ParseServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .no_proxy()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Asks the service to parse `text`.
    ///
    /// # Returns
    ///
    /// * `Ok(Ok(TransferIntent))` - Service produced a valid intent
    /// * `Ok(Err(ParseError))` - Service answered but the payload was rejected
    /// * `Err(anyhow::Error)` - Service unreachable or response is not JSON
    pub async fn parse(&self, text: &str) -> Result<std::result::Result<TransferIntent, ParseError>> {
        let url = format!("{}/parse", self.base_url);
        let body: serde_json::Value = self
            .client
            .post(&url)
            .json(&ParseRequest { message: text })
            .send()
            .await
            .context("Failed to send parse request")?
            .error_for_status()
            .context("Parse service returned an HTTP error")?
            .json()
            .await
            .context("Failed to parse service response")?;

        let response: ParseResponse = match serde_json::from_value(body) {
            Ok(response) => response,
            Err(e) => {
                warn!("Parse service payload did not match the intent schema: {}", e);
                return Ok(Err(ParseError::NoMatch));
            }
        };

        match response {
            ParseResponse::Error(err) => {
                warn!("Parse service error: {}", err.error);
                Ok(Err(ParseError::Upstream {
                    error: err.error,
                    raw: err.raw,
                }))
            }
            ParseResponse::Intent(remote) => {
                let result = validate_remote_intent(remote);
                if let Ok(intent) = &result {
                    info!(
                        "Parse service intent: {} {} {} -> {}",
                        intent.amount, intent.token, intent.from, intent.to
                    );
                }
                Ok(result)
            }
        }
    }
}
