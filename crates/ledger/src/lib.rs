//! Bazaar Ledger Crate
//!
//! Read and write access to the NFT marketplace module published on an
//! Aptos-style ledger.
//!
//! # Overview
//!
//! - Read-only view calls and whole-resource reads
//! - Transaction submission through an injected wallet, awaited to finality
//! - Readers for the loosely-typed values the node returns
//! - An error taxonomy that names the failing function or resource
//!
//! # Architecture
//!
//! ```text
//! +---------------------+      +---------------------+
//! |  Reconciliation     | ---> |  LedgerQueryClient  |  (trait seam)
//! +---------------------+      +---------------------+
//!                                        |
//!                                        v
//!                              +---------------------+      +----------------+
//!                              |  RestLedgerClient   | ---> | WalletProvider |
//!                              +---------------------+      +----------------+
//!                                        |
//!                                        v
//!                                  full node (REST)
//! ```
//!
//! Nothing in this crate retries. Callers own pacing and retry policy.

pub mod client;
pub mod errors;
pub mod models;

pub use client::{
    LedgerQueryClient, RemoteSignerWallet, RestClientConfig, RestLedgerClient, WalletProvider,
    DEFAULT_NODE_URL,
};
pub use errors::{LedgerError, RetryClass};
pub use models::{
    addresses_equal, is_zero_address, value_as_bool, value_as_u64, value_as_u64_list, Address,
    EntryFunctionPayload, MoveValue, ObjectReader, PendingTransaction, TransactionResult,
    TupleReader, ZERO_ADDRESS,
};
