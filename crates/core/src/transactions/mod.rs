//! Write path: payload builders and failure classification.
//!
//! Submission itself goes through [`bazaar_ledger::LedgerQueryClient::submit_and_await`].

mod errors;
mod payloads;

pub use errors::{classify, TransactionError, TxErrorKind};
pub use payloads::MarketplacePayloads;
