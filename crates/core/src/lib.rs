//! Bazaar Core - Reconciliation of on-chain marketplace state.
//!
//! This crate turns the marketplace module's views into consistent
//! snapshots of items and auctions, keeps them fresh on a schedule, and
//! finalizes auctions that ran past their end time. It talks to the ledger
//! only through the `bazaar-ledger` traits.

pub mod codec;
pub mod constants;
pub mod errors;
pub mod events;
pub mod expiry;
pub mod marketplace;
pub mod money;
pub mod scheduler;
pub mod throttle;
pub mod transactions;
pub mod utils;

#[cfg(test)]
mod testing;

pub use marketplace::{
    Auction, Item, ItemFilter, MarketplaceConfig, MarketplaceSnapshot, Rarity,
    ReconciliationEngine, RefreshOutcome, ViewScope,
};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
