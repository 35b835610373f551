//! Wallet provider that delegates signing to an external signer service.
//!
//! The signer receives the entry-function payload as JSON and answers with
//! the submitted transaction hash. Key custody stays with the signer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::client::WalletProvider;
use crate::errors::LedgerError;
use crate::models::{EntryFunctionPayload, PendingTransaction};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct SignerResponse {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct SignerErrorBody {
    message: String,
}

/// [`WalletProvider`] backed by an HTTP signer (`POST {url}` with the payload).
pub struct RemoteSignerWallet {
    client: Client,
    url: String,
    account: Option<String>,
}

impl RemoteSignerWallet {
    pub fn new(url: impl Into<String>, account: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            url: url.into(),
            account,
        }
    }
}

#[async_trait]
impl WalletProvider for RemoteSignerWallet {
    fn account_address(&self) -> Option<String> {
        self.account.clone()
    }

    async fn sign_and_submit(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, LedgerError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| LedgerError::SubmissionFailed {
                message: e.to_string(),
            })?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(LedgerError::RateLimited {
                target: payload.function.clone(),
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let message = match response.json::<SignerErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => format!("HTTP error: {}", status),
            };
            return Err(LedgerError::SubmissionFailed { message });
        }

        let body: SignerResponse =
            response
                .json()
                .await
                .map_err(|e| LedgerError::InvalidResponse {
                    context: payload.function.clone(),
                    message: e.to_string(),
                })?;

        Ok(PendingTransaction { hash: body.hash })
    }
}
