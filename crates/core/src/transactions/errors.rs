//! Classification of failed marketplace writes.
//!
//! The module aborts with named error constants that end up somewhere in the
//! VM status or wallet message. Classification is a substring match; the
//! first matching row wins.

use bazaar_ledger::LedgerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-facing category of a failed write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxErrorKind {
    /// The auction was already finalized. Benign for finalize attempts.
    AlreadyInactive,
    InsufficientFunds,
    AuctionEnded,
    BidTooLow,
    SellerSelfBid,
    DuplicateName,
    DuplicateResource,
    OwnItemPurchase,
    NotForSale,
    InsufficientPayment,
    PermissionDenied,
    Other,
}

const PATTERNS: &[(&[&str], TxErrorKind)] = &[
    (
        &["EAUCTION_NOT_ACTIVE", "EAUCTION_ALREADY_ENDED", "EAUCTION_INACTIVE"],
        TxErrorKind::AlreadyInactive,
    ),
    (
        &["EINSUFFICIENT_FUNDS", "INSUFFICIENT_BALANCE"],
        TxErrorKind::InsufficientFunds,
    ),
    (&["EAUCTION_ENDED"], TxErrorKind::AuctionEnded),
    (&["EBID_TOO_LOW"], TxErrorKind::BidTooLow),
    (&["ESELLER_CANNOT_BID"], TxErrorKind::SellerSelfBid),
    (&["EDUPLICATE_NFT_NAME"], TxErrorKind::DuplicateName),
    (&["EDUPLICATE_NFT_URI"], TxErrorKind::DuplicateResource),
    (
        &["ECANNOT_BUY_OWN_NFT", "code: 402", "Cannot buy own NFT"],
        TxErrorKind::OwnItemPurchase,
    ),
    (&["ENFT_NOT_FOR_SALE", "code: 400"], TxErrorKind::NotForSale),
    (
        &["EINSUFFICIENT_PAYMENT", "code: 401"],
        TxErrorKind::InsufficientPayment,
    ),
    (
        &["ENOT_OWNER", "ENOT_AUTHORIZED", "EPERMISSION_DENIED"],
        TxErrorKind::PermissionDenied,
    ),
];

/// Maps a failure message to its category.
pub fn classify(message: &str) -> TxErrorKind {
    PATTERNS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| message.contains(n)))
        .map(|(_, kind)| *kind)
        .unwrap_or(TxErrorKind::Other)
}

impl TxErrorKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::AlreadyInactive => "Auction Already Ended",
            Self::InsufficientFunds => "Insufficient Balance",
            Self::AuctionEnded => "Auction Ended",
            Self::BidTooLow => "Bid Too Low",
            Self::SellerSelfBid => "Cannot Bid On Own Auction",
            Self::DuplicateName => "Duplicate NFT Name",
            Self::DuplicateResource => "Duplicate Image",
            Self::OwnItemPurchase => "Cannot Buy Own NFT",
            Self::NotForSale => "NFT Not For Sale",
            Self::InsufficientPayment => "Insufficient Payment",
            Self::PermissionDenied => "Permission Denied",
            Self::Other => "Transaction Failed",
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            Self::AlreadyInactive => "This auction has already been finalized.",
            Self::InsufficientFunds => "You don't have enough balance for this transaction.",
            Self::AuctionEnded => "This auction has already ended.",
            Self::BidTooLow => "Bid must be higher than the current price.",
            Self::SellerSelfBid => "You cannot bid on your own auction.",
            Self::DuplicateName => {
                "This NFT name is already taken. Please choose a different name for your NFT."
            }
            Self::DuplicateResource => {
                "This image is already being used by another NFT. Please use a different image."
            }
            Self::OwnItemPurchase => "You cannot purchase your own NFT.",
            Self::NotForSale => "This NFT is not available for purchase.",
            Self::InsufficientPayment => {
                "The payment amount is insufficient to purchase this NFT."
            }
            Self::PermissionDenied => "You are not allowed to perform this action.",
            Self::Other => "The transaction could not be completed. Please try again.",
        }
    }
}

/// A classified write failure. `message` keeps the raw text for logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {message}", .kind.title())]
pub struct TransactionError {
    pub kind: TxErrorKind,
    pub message: String,
}

impl TransactionError {
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify(&message),
            message,
        }
    }

    pub fn is_already_inactive(&self) -> bool {
        self.kind == TxErrorKind::AlreadyInactive
    }
}

impl From<&LedgerError> for TransactionError {
    fn from(error: &LedgerError) -> Self {
        Self::from_message(error.failure_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_failures() {
        assert_eq!(
            classify("Move abort in 0x1::nft_marketplace: ECANNOT_BUY_OWN_NFT(0x192)"),
            TxErrorKind::OwnItemPurchase
        );
        assert_eq!(classify("Move abort code: 402"), TxErrorKind::OwnItemPurchase);
        assert_eq!(classify("ENFT_NOT_FOR_SALE"), TxErrorKind::NotForSale);
        assert_eq!(classify("abort code: 400"), TxErrorKind::NotForSale);
        assert_eq!(classify("code: 401"), TxErrorKind::InsufficientPayment);
        assert_eq!(
            classify("INSUFFICIENT_BALANCE_FOR_TRANSACTION_FEE"),
            TxErrorKind::InsufficientFunds
        );
    }

    #[test]
    fn test_bid_failures() {
        assert_eq!(classify("EINSUFFICIENT_FUNDS"), TxErrorKind::InsufficientFunds);
        assert_eq!(classify("EAUCTION_ENDED"), TxErrorKind::AuctionEnded);
        assert_eq!(classify("EBID_TOO_LOW"), TxErrorKind::BidTooLow);
        assert_eq!(classify("ESELLER_CANNOT_BID"), TxErrorKind::SellerSelfBid);
    }

    #[test]
    fn test_mint_and_permission_failures() {
        assert_eq!(classify("EDUPLICATE_NFT_NAME"), TxErrorKind::DuplicateName);
        assert_eq!(classify("EDUPLICATE_NFT_URI"), TxErrorKind::DuplicateResource);
        assert_eq!(classify("ENOT_OWNER"), TxErrorKind::PermissionDenied);
    }

    #[test]
    fn test_already_inactive_wins() {
        assert_eq!(
            classify("Move abort: EAUCTION_NOT_ACTIVE"),
            TxErrorKind::AlreadyInactive
        );
        assert_eq!(classify("EAUCTION_ALREADY_ENDED"), TxErrorKind::AlreadyInactive);
    }

    #[test]
    fn test_unknown_message_is_other() {
        assert_eq!(classify("something exploded"), TxErrorKind::Other);
        assert_eq!(classify(""), TxErrorKind::Other);
    }

    #[test]
    fn test_from_ledger_error_uses_vm_status() {
        let error = LedgerError::TransactionFailed {
            hash: "0xabc".to_string(),
            vm_status: "Move abort: EBID_TOO_LOW".to_string(),
        };
        let tx = TransactionError::from(&error);
        assert_eq!(tx.kind, TxErrorKind::BidTooLow);
        assert_eq!(tx.to_string(), "Bid Too Low: Move abort: EBID_TOO_LOW");
    }
}
