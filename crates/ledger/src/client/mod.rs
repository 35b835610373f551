//! Ledger client abstractions and implementations.
//!
//! This module contains:
//! - The `LedgerQueryClient` trait the reconciliation layer depends on
//! - The `WalletProvider` trait for injected transaction signing
//! - `RestLedgerClient`, the full-node REST implementation
//! - `RemoteSignerWallet`, a wallet that forwards payloads to a signer service

mod remote_signer;
mod rest;
mod traits;

pub use remote_signer::RemoteSignerWallet;
pub use rest::{RestClientConfig, RestLedgerClient, DEFAULT_NODE_URL};
pub use traits::{LedgerQueryClient, WalletProvider};
