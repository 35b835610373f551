//! Error types and retry classification for the ledger crate.
//!
//! This module provides:
//! - [`LedgerError`]: The main error enum for all ledger operations
//! - [`RetryClass`]: Classification for deciding whether the next poll cycle may succeed

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while talking to the remote ledger.
///
/// Every variant that originates from a specific remote call carries the
/// function or resource name so failures can be traced back in logs.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A read-only view function call was rejected or failed.
    #[error("View call failed: {function} - {message}")]
    ViewFailed {
        /// Fully-qualified function id
        function: String,
        /// The error message from the node
        message: String,
    },

    /// The addressed resource does not exist (HTTP 404).
    /// Usually means the marketplace has not been published at this address.
    #[error("Resource not found: {resource}")]
    ResourceNotFound {
        /// Fully-qualified resource type
        resource: String,
    },

    /// Reading a whole resource failed for a reason other than absence.
    #[error("Resource read failed: {resource} - {message}")]
    ResourceReadFailed {
        /// Fully-qualified resource type
        resource: String,
        /// The error message from the node
        message: String,
    },

    /// The node rate limited the request (HTTP 429).
    #[error("Rate limited: {target}")]
    RateLimited {
        /// Function, resource or transaction hash being requested
        target: String,
    },

    /// The request to the node timed out.
    #[error("Timeout: {target}")]
    Timeout {
        /// Function, resource or transaction hash being requested
        target: String,
    },

    /// No wallet provider has been injected, so nothing can be signed.
    #[error("No wallet provider available")]
    WalletUnavailable,

    /// The wallet refused or failed to sign and submit the payload.
    #[error("Submission failed: {message}")]
    SubmissionFailed {
        /// The error message from the wallet
        message: String,
    },

    /// The transaction was committed but aborted on-chain.
    /// `vm_status` holds the abort code text used for user-facing classification.
    #[error("Transaction {hash} failed: {vm_status}")]
    TransactionFailed {
        /// Transaction hash
        hash: String,
        /// VM status reported by the node
        vm_status: String,
    },

    /// The transaction did not reach finality within the configured timeout.
    #[error("Transaction {hash} not final before timeout")]
    FinalityTimeout {
        /// Transaction hash
        hash: String,
    },

    /// The node answered with a body that did not have the expected shape.
    #[error("Invalid response for {context}: {message}")]
    InvalidResponse {
        /// What was being decoded
        context: String,
        /// Description of the mismatch
        message: String,
    },

    /// A network error occurred while communicating with the node.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl LedgerError {
    /// Returns the retry classification for this error.
    ///
    /// Nothing in this crate retries inline. The class tells the caller whether
    /// waiting for the next poll cycle is expected to help.
    ///
    /// # Examples
    ///
    /// ```
    /// use bazaar_ledger::errors::{LedgerError, RetryClass};
    ///
    /// let error = LedgerError::RateLimited { target: "get_auction_details".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::NextCycle);
    ///
    /// let error = LedgerError::WalletUnavailable;
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // Transient node conditions
            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::FinalityTimeout { .. }
            | Self::Network(_) => RetryClass::NextCycle,

            // The node answered, just not with something usable yet
            Self::ViewFailed { .. }
            | Self::ResourceNotFound { .. }
            | Self::ResourceReadFailed { .. }
            | Self::InvalidResponse { .. } => RetryClass::NextCycle,

            // Write path - the same payload would be rejected again
            Self::WalletUnavailable
            | Self::SubmissionFailed { .. }
            | Self::TransactionFailed { .. } => RetryClass::Never,
        }
    }

    /// Text used to classify write failures into user-facing categories.
    ///
    /// For on-chain aborts this is the VM status; otherwise the display string.
    pub fn failure_text(&self) -> String {
        match self {
            Self::TransactionFailed { vm_status, .. } => vm_status.clone(),
            other => other.to_string(),
        }
    }
}
