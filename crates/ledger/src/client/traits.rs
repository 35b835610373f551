//! Ledger access trait definitions.
//!
//! `LedgerQueryClient` is the seam the reconciliation layer is written
//! against; `WalletProvider` is the injected signer used for writes.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::LedgerError;
use crate::models::{EntryFunctionPayload, MoveValue, PendingTransaction, TransactionResult};

/// Read and write primitives against the remote ledger.
///
/// Implementations must not retry. A failure is returned as-is, carrying the
/// function or resource name, and the caller decides what to do with it.
///
/// # Example
///
/// ```ignore
/// let values = client
///     .call_view("0x1::nft_marketplace::is_marketplace_initialized", vec![json!("0x1")])
///     .await?;
/// ```
#[async_trait]
pub trait LedgerQueryClient: Send + Sync {
    /// Invokes a read-only view function with positional arguments.
    ///
    /// Returns the function's result tuple, one loosely-typed value per
    /// return type.
    async fn call_view(
        &self,
        function: &str,
        args: Vec<MoveValue>,
    ) -> Result<Vec<MoveValue>, LedgerError>;

    /// Reads a whole resource stored under `address`.
    ///
    /// Returns the resource's `data` object.
    async fn read_resource(&self, address: &str, resource_type: &str)
        -> Result<Value, LedgerError>;

    /// Submits a transaction through the injected wallet and waits until it
    /// is final.
    ///
    /// An on-chain abort is reported as [`LedgerError::TransactionFailed`].
    async fn submit_and_await(
        &self,
        payload: EntryFunctionPayload,
    ) -> Result<TransactionResult, LedgerError>;
}

/// Signs and submits payloads on behalf of a connected account.
///
/// Session management lives outside this crate; implementations only have
/// to turn a payload into a submitted transaction hash.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Address of the signing account, if one is connected.
    fn account_address(&self) -> Option<String>;

    async fn sign_and_submit(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, LedgerError>;
}
