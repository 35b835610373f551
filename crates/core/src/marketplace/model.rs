use bazaar_ledger::{is_zero_address, Address};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::to_major;

/// Rarity tier of an item (1-4 on the ledger).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    SuperRare,
}

impl Rarity {
    pub fn from_tier(tier: u64) -> Option<Self> {
        match tier {
            1 => Some(Self::Common),
            2 => Some(Self::Uncommon),
            3 => Some(Self::Rare),
            4 => Some(Self::SuperRare),
            _ => None,
        }
    }

    pub fn tier(self) -> u8 {
        match self {
            Self::Common => 1,
            Self::Uncommon => 2,
            Self::Rare => 3,
            Self::SuperRare => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::SuperRare => "Super Rare",
        }
    }
}

/// A listed item, rebuilt from the ledger every cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub owner: Address,
    pub name: String,
    pub description: String,
    /// Resource locator (image URI)
    pub uri: String,
    /// Price in base units
    pub price_units: u64,
    pub for_sale: bool,
    pub rarity: Rarity,
    /// Derived: an active, unexpired auction references this item.
    pub in_auction: bool,
}

impl Item {
    /// Price in major units.
    pub fn price(&self) -> Decimal {
        to_major(self.price_units)
    }
}

/// Item fields shown alongside an auction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionItemDetails {
    pub name: String,
    pub description: String,
    pub uri: String,
    pub rarity: Rarity,
}

/// A time-bound sale, rebuilt from the ledger every cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    pub auction_id: u64,
    pub item_id: u64,
    pub seller: Address,
    pub start_price_units: u64,
    pub current_price_units: u64,
    /// Zero address while nobody has bid
    pub highest_bidder: Address,
    /// Unix seconds
    pub end_time: u64,
    /// As reported by the ledger
    pub is_active: bool,
    /// Joined item fields; `None` in the lightweight membership form.
    pub item: Option<AuctionItemDetails>,
}

/// Derived auction flags at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionStatus {
    pub is_active: bool,
    pub is_ended: bool,
    pub has_bidder: bool,
    pub is_failed: bool,
    pub is_closed: bool,
}

/// Client-observed lifecycle of an auction.
///
/// `Open -> PendingFinalize -> Settled | Failed`. Leaving `PendingFinalize`
/// requires the ledger to report the auction inactive, which only happens
/// after a finalize transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionPhase {
    Open,
    PendingFinalize,
    Settled,
    Failed,
}

impl Auction {
    pub fn start_price(&self) -> Decimal {
        to_major(self.start_price_units)
    }

    pub fn current_price(&self) -> Decimal {
        to_major(self.current_price_units)
    }

    pub fn has_bidder(&self) -> bool {
        !is_zero_address(&self.highest_bidder)
    }

    pub fn is_ended(&self, now: u64) -> bool {
        self.end_time <= now
    }

    pub fn is_failed(&self, now: u64) -> bool {
        self.is_ended(now) && !self.has_bidder()
    }

    pub fn is_closed(&self, now: u64) -> bool {
        self.is_ended(now) || !self.is_active
    }

    /// Accepting bids: active on the ledger and not past its end time.
    pub fn is_open(&self, now: u64) -> bool {
        !self.is_closed(now)
    }

    /// Past its end time while the ledger still reports it active.
    pub fn is_overdue(&self, now: u64) -> bool {
        self.is_active && self.end_time > 0 && self.end_time <= now
    }

    /// Seconds until the end time, zero once ended.
    pub fn seconds_left(&self, now: u64) -> u64 {
        self.end_time.saturating_sub(now)
    }

    pub fn status(&self, now: u64) -> AuctionStatus {
        AuctionStatus {
            is_active: self.is_active,
            is_ended: self.is_ended(now),
            has_bidder: self.has_bidder(),
            is_failed: self.is_failed(now),
            is_closed: self.is_closed(now),
        }
    }

    pub fn phase(&self, now: u64) -> AuctionPhase {
        match (self.is_active, self.is_ended(now), self.has_bidder()) {
            (true, false, _) => AuctionPhase::Open,
            (true, true, _) => AuctionPhase::PendingFinalize,
            (false, _, true) => AuctionPhase::Settled,
            (false, _, false) => AuctionPhase::Failed,
        }
    }
}
