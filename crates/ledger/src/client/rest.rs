//! REST full-node client.
//!
//! Talks to an Aptos-style full node over its JSON REST API.
//!
//! # API Endpoints
//!
//! - View call: `POST {node}/view` with `{ function, type_arguments, arguments }`
//! - Resource read: `GET {node}/accounts/{address}/resource/{resource_type}`
//! - Transaction lookup: `GET {node}/transactions/by_hash/{hash}`
//!
//! Writes are signed and submitted by the injected [`WalletProvider`]; this
//! client only waits for the resulting hash to become final.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{LedgerQueryClient, WalletProvider};
use crate::errors::LedgerError;
use crate::models::{
    parse_micros_timestamp, value_as_u64, EntryFunctionPayload, MoveValue, TransactionResult,
};

/// Public devnet full node.
pub const DEFAULT_NODE_URL: &str = "https://fullnode.devnet.aptoslabs.com/v1";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How often a submitted transaction is looked up while waiting for finality.
const FINALITY_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Give up waiting for a submitted transaction after this long.
const FINALITY_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for [`RestLedgerClient`].
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL including the API version segment, without trailing slash.
    pub node_url: String,
    pub request_timeout: Duration,
    pub finality_poll_interval: Duration,
    pub finality_timeout: Duration,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.to_string(),
            request_timeout: REQUEST_TIMEOUT,
            finality_poll_interval: FINALITY_POLL_INTERVAL,
            finality_timeout: FINALITY_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
struct ViewRequest<'a> {
    function: &'a str,
    type_arguments: Vec<String>,
    arguments: Vec<MoveValue>,
}

/// Error body returned by the node on 4xx/5xx.
#[derive(Debug, Deserialize)]
struct NodeErrorBody {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceResponse {
    data: Value,
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    #[serde(rename = "type")]
    kind: String,
    hash: String,
    #[serde(default)]
    version: Option<Value>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vm_status: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

/// Ledger client backed by a full node's REST API.
///
/// # Example
///
/// ```ignore
/// let client = RestLedgerClient::new(RestClientConfig::default()).with_wallet(wallet);
/// let values = client.call_view(&function, vec![json!(address)]).await?;
/// ```
pub struct RestLedgerClient {
    client: Client,
    config: RestClientConfig,
    wallet: Option<Arc<dyn WalletProvider>>,
}

impl RestLedgerClient {
    pub fn new(config: RestClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            config,
            wallet: None,
        }
    }

    /// Attaches the wallet used by [`LedgerQueryClient::submit_and_await`].
    pub fn with_wallet(mut self, wallet: Arc<dyn WalletProvider>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.node_url.trim_end_matches('/'), path)
    }

    fn transport_error(target: &str, error: reqwest::Error) -> LedgerError {
        if error.is_timeout() {
            LedgerError::Timeout {
                target: target.to_string(),
            }
        } else {
            LedgerError::Network(error)
        }
    }

    /// Pulls the node's error message out of a failed response.
    async fn error_message(response: Response) -> String {
        let status = response.status();
        match response.json::<NodeErrorBody>().await {
            Ok(body) => match body.error_code {
                Some(code) => format!("{} ({})", body.message, code),
                None => body.message,
            },
            Err(_) => format!("HTTP error: {}", status),
        }
    }

    /// Looks up a transaction once. `Ok(None)` means not final yet.
    async fn lookup_transaction(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionResult>, LedgerError> {
        let url = self.url(&format!("transactions/by_hash/{}", hash));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(hash, e))?;

        match response.status() {
            // Not yet indexed by this node
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(LedgerError::RateLimited {
                    target: hash.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(LedgerError::InvalidResponse {
                    context: hash.to_string(),
                    message: Self::error_message(response).await,
                })
            }
            _ => {}
        }

        let body: TransactionResponse =
            response
                .json()
                .await
                .map_err(|e| LedgerError::InvalidResponse {
                    context: hash.to_string(),
                    message: e.to_string(),
                })?;

        if body.kind == "pending_transaction" {
            return Ok(None);
        }

        Ok(Some(TransactionResult {
            hash: body.hash,
            version: body.version.as_ref().and_then(value_as_u64),
            success: body.success.unwrap_or(false),
            vm_status: body.vm_status.unwrap_or_default(),
            committed_at: body.timestamp.as_deref().and_then(parse_micros_timestamp),
        }))
    }

    /// Polls until the transaction is final or the finality timeout elapses.
    async fn wait_for_transaction(&self, hash: &str) -> Result<TransactionResult, LedgerError> {
        let deadline = tokio::time::Instant::now() + self.config.finality_timeout;

        loop {
            if let Some(result) = self.lookup_transaction(hash).await? {
                return Ok(result);
            }
            if tokio::time::Instant::now() >= deadline {
                warn!("Transaction {} still pending after {:?}", hash, self.config.finality_timeout);
                return Err(LedgerError::FinalityTimeout {
                    hash: hash.to_string(),
                });
            }
            tokio::time::sleep(self.config.finality_poll_interval).await;
        }
    }
}

#[async_trait]
impl LedgerQueryClient for RestLedgerClient {
    async fn call_view(
        &self,
        function: &str,
        args: Vec<MoveValue>,
    ) -> Result<Vec<MoveValue>, LedgerError> {
        let request = ViewRequest {
            function,
            type_arguments: Vec::new(),
            arguments: args,
        };

        let response = self
            .client
            .post(self.url("view"))
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::transport_error(function, e))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(LedgerError::RateLimited {
                target: function.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(LedgerError::ViewFailed {
                function: function.to_string(),
                message: Self::error_message(response).await,
            });
        }

        let values: Vec<MoveValue> =
            response
                .json()
                .await
                .map_err(|e| LedgerError::InvalidResponse {
                    context: function.to_string(),
                    message: e.to_string(),
                })?;

        debug!("View {} returned {} value(s)", function, values.len());
        Ok(values)
    }

    async fn read_resource(
        &self,
        address: &str,
        resource_type: &str,
    ) -> Result<Value, LedgerError> {
        let url = self.url(&format!(
            "accounts/{}/resource/{}",
            address,
            urlencoding::encode(resource_type)
        ));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(resource_type, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(LedgerError::ResourceNotFound {
                    resource: resource_type.to_string(),
                })
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(LedgerError::RateLimited {
                    target: resource_type.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(LedgerError::ResourceReadFailed {
                    resource: resource_type.to_string(),
                    message: Self::error_message(response).await,
                })
            }
            _ => {}
        }

        let body: ResourceResponse =
            response
                .json()
                .await
                .map_err(|e| LedgerError::InvalidResponse {
                    context: resource_type.to_string(),
                    message: e.to_string(),
                })?;

        Ok(body.data)
    }

    async fn submit_and_await(
        &self,
        payload: EntryFunctionPayload,
    ) -> Result<TransactionResult, LedgerError> {
        let wallet = self.wallet.as_ref().ok_or(LedgerError::WalletUnavailable)?;

        let pending = wallet.sign_and_submit(&payload).await?;
        debug!("Submitted {} as {}", payload.function, pending.hash);

        let result = self.wait_for_transaction(&pending.hash).await?;
        if !result.success {
            return Err(LedgerError::TransactionFailed {
                hash: result.hash,
                vm_status: result.vm_status,
            });
        }
        Ok(result)
    }
}
