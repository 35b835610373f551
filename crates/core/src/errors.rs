//! Core error types for Bazaar.
//!
//! Ledger transport errors are wrapped as-is; everything the reconciliation
//! layer decides on its own has a dedicated variant.

use bazaar_ledger::LedgerError;
use thiserror::Error;

use crate::transactions::TransactionError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the marketplace client.
#[derive(Error, Debug)]
pub enum Error {
    /// The marketplace module has not been initialized at this address.
    /// Fatal to the current cycle, retried on the next one.
    #[error("Marketplace at {marketplace} is not initialized")]
    Uninitialized { marketplace: String },

    #[error("Ledger operation failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Decoding failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Transaction(#[from] TransactionError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// A ledger record that could not be turned into a domain record.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{record} {id}: {source}")]
    Field {
        record: &'static str,
        id: u64,
        #[source]
        source: LedgerError,
    },

    #[error("{record}: {source}")]
    Shape {
        record: &'static str,
        #[source]
        source: LedgerError,
    },

    #[error("{record} {id}: rarity {rarity} outside 1-4")]
    Rarity {
        record: &'static str,
        id: u64,
        rarity: u64,
    },
}

/// Client-side checks performed before a payload is handed to the wallet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Amount {0} cannot be represented in base units")]
    AmountOutOfRange(String),

    #[error("Rarity must be between 1 and 4, got {0}")]
    InvalidRarity(u8),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("Duration must be between {min} and {max} seconds, got {got}")]
    InvalidDuration { min: u64, max: u64, got: u64 },

    #[error("Bid must be higher than the current price ({current})")]
    BidTooLow { current: String },

    #[error("This auction has ended")]
    AuctionClosed,

    #[error("You cannot bid on your own auction")]
    SellerCannotBid,

    #[error("You cannot buy your own NFT")]
    OwnItem,

    #[error("This NFT is not for sale")]
    NotForSale,

    #[error("This NFT is locked in an auction")]
    LockedInAuction,
}

impl Error {
    /// True for conditions a consumer should surface to the user.
    ///
    /// Record-level decode failures and throttle skips are absorbed by the
    /// engine and never reach this point.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Self::Uninitialized { .. } | Self::Transaction(_) | Self::Validation(_)
        )
    }
}
