//! Expiry module - finalization of overdue auctions.

mod watcher;

#[cfg(test)]
mod watcher_tests;

pub use watcher::{ExpiryWatcher, SweepReport};
