//! Immutable reconciled view of the marketplace.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{Auction, Item, Rarity};

/// Projection filter applied after reconciliation.
///
/// Filtering never changes what is fetched: `in_auction` needs the full set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub rarity: Option<Rarity>,
    pub for_sale_only: bool,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        let rarity_ok = self.rarity.map_or(true, |r| item.rarity == r);
        let sale_ok = !self.for_sale_only || item.for_sale;
        rarity_ok && sale_ok
    }
}

/// One fully reconciled cycle. Consumers only read it; the engine replaces
/// it wholesale on the next cycle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceSnapshot {
    /// Engine cycle that produced this snapshot (0 before the first cycle)
    pub cycle: u64,
    pub initialized: bool,
    pub items: Vec<Item>,
    pub auctions: Vec<Auction>,
    pub published_at: Option<DateTime<Utc>>,
}

impl MarketplaceSnapshot {
    /// Joins items with auctions.
    ///
    /// Auctions are resolved first; every item's `in_auction` flag is then
    /// recomputed from them, discarding whatever the item carried before.
    pub fn assemble(
        cycle: u64,
        mut items: Vec<Item>,
        auctions: Vec<Auction>,
        now: u64,
        published_at: DateTime<Utc>,
    ) -> Self {
        let locked: HashSet<u64> = auctions
            .iter()
            .filter(|a| a.is_open(now))
            .map(|a| a.item_id)
            .collect();

        for item in items.iter_mut() {
            item.in_auction = locked.contains(&item.id);
        }

        Self {
            cycle,
            initialized: true,
            items,
            auctions,
            published_at: Some(published_at),
        }
    }

    /// Snapshot published when the marketplace has not been initialized.
    pub fn uninitialized(cycle: u64, published_at: DateTime<Utc>) -> Self {
        Self {
            cycle,
            initialized: false,
            items: Vec::new(),
            auctions: Vec::new(),
            published_at: Some(published_at),
        }
    }

    pub fn item(&self, id: u64) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn items_matching(&self, filter: &ItemFilter) -> Vec<&Item> {
        self.items.iter().filter(|i| filter.matches(i)).collect()
    }

    /// Items that can be bought outright.
    ///
    /// Excludes anything referenced by an auction the ledger still reports
    /// active, even one past its end time that nobody has finalized yet.
    pub fn buy_now_items(&self, rarity: Option<Rarity>) -> Vec<&Item> {
        let locked: HashSet<u64> = self
            .auctions
            .iter()
            .filter(|a| a.is_active)
            .map(|a| a.item_id)
            .collect();

        let filter = ItemFilter {
            rarity,
            for_sale_only: true,
        };

        self.items
            .iter()
            .filter(|i| filter.matches(i) && !i.in_auction && !locked.contains(&i.id))
            .collect()
    }

    pub fn auction_for_item(&self, item_id: u64) -> Option<&Auction> {
        self.auctions
            .iter()
            .find(|a| a.item_id == item_id && a.is_active)
            .or_else(|| self.auctions.iter().find(|a| a.item_id == item_id))
    }

    pub fn open_auctions(&self, now: u64) -> Vec<&Auction> {
        self.auctions.iter().filter(|a| a.is_open(now)).collect()
    }

    pub fn failed_auctions(&self, now: u64) -> Vec<&Auction> {
        self.auctions.iter().filter(|a| a.is_failed(now)).collect()
    }

    /// Ended by the clock but still active on the ledger.
    pub fn overdue_auctions(&self, now: u64) -> Vec<&Auction> {
        self.auctions.iter().filter(|a| a.is_overdue(now)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const NOW: u64 = 1_700_000_000;

    fn item(id: u64, for_sale: bool, rarity: Rarity) -> Item {
        Item {
            id,
            owner: "0xowner".to_string(),
            name: format!("item {}", id),
            description: String::new(),
            uri: format!("ipfs://{}", id),
            price_units: 100_000_000,
            for_sale,
            rarity,
            in_auction: false,
        }
    }

    fn auction(auction_id: u64, item_id: u64, end_time: u64, is_active: bool) -> Auction {
        Auction {
            auction_id,
            item_id,
            seller: "0xseller".to_string(),
            start_price_units: 1,
            current_price_units: 1,
            highest_bidder: "0x0".to_string(),
            end_time,
            is_active,
            item: None,
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.timestamp_opt(NOW as i64, 0).unwrap()
    }

    #[test]
    fn test_in_auction_only_for_open_auctions() {
        let snapshot = MarketplaceSnapshot::assemble(
            1,
            vec![
                item(7, true, Rarity::Common),
                item(9, false, Rarity::Rare),
                item(11, false, Rarity::Rare),
                item(12, true, Rarity::Rare),
            ],
            vec![
                auction(1, 9, NOW + 300, true),
                auction(2, 11, NOW - 10, true),
                auction(3, 12, NOW + 300, false),
            ],
            NOW,
            at(),
        );

        assert!(!snapshot.item(7).unwrap().in_auction);
        assert!(snapshot.item(9).unwrap().in_auction);
        // Expired but not finalized: not in auction, still locked for buy-now
        assert!(!snapshot.item(11).unwrap().in_auction);
        assert!(!snapshot.item(12).unwrap().in_auction);
    }

    #[test]
    fn test_assemble_overwrites_stale_flags() {
        let mut stale = item(7, true, Rarity::Common);
        stale.in_auction = true;
        let snapshot = MarketplaceSnapshot::assemble(2, vec![stale], vec![], NOW, at());
        assert!(!snapshot.items[0].in_auction);
        assert!(snapshot.initialized);
        assert_eq!(snapshot.cycle, 2);
    }

    #[test]
    fn test_buy_now_excludes_locked_items() {
        let snapshot = MarketplaceSnapshot::assemble(
            1,
            vec![
                item(1, true, Rarity::Common),
                item(2, true, Rarity::Common),
                item(3, true, Rarity::Common),
                item(4, false, Rarity::Common),
            ],
            vec![auction(10, 2, NOW + 60, true), auction(11, 3, NOW - 60, true)],
            NOW,
            at(),
        );

        let ids: Vec<u64> = snapshot.buy_now_items(None).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_filters_apply_to_projection_only() {
        let snapshot = MarketplaceSnapshot::assemble(
            1,
            vec![
                item(1, true, Rarity::Common),
                item(2, true, Rarity::Rare),
                item(3, false, Rarity::Rare),
            ],
            vec![],
            NOW,
            at(),
        );

        let rare = snapshot.items_matching(&ItemFilter {
            rarity: Some(Rarity::Rare),
            for_sale_only: false,
        });
        assert_eq!(rare.len(), 2);

        let rare_for_sale = snapshot.buy_now_items(Some(Rarity::Rare));
        assert_eq!(rare_for_sale.len(), 1);
        assert_eq!(rare_for_sale[0].id, 2);

        // Raw list keeps everything
        assert_eq!(snapshot.items.len(), 3);
    }

    #[test]
    fn test_auction_projections() {
        let snapshot = MarketplaceSnapshot::assemble(
            1,
            vec![],
            vec![
                auction(1, 5, NOW + 60, true),
                auction(2, 6, NOW - 60, true),
                auction(3, 7, NOW - 60, false),
            ],
            NOW,
            at(),
        );

        assert_eq!(snapshot.open_auctions(NOW).len(), 1);
        assert_eq!(snapshot.overdue_auctions(NOW).len(), 1);
        assert_eq!(snapshot.failed_auctions(NOW).len(), 2);
        assert_eq!(snapshot.auction_for_item(6).unwrap().auction_id, 2);
        assert!(snapshot.auction_for_item(99).is_none());
    }

    #[test]
    fn test_uninitialized_snapshot() {
        let snapshot = MarketplaceSnapshot::uninitialized(3, at());
        assert!(!snapshot.initialized);
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.cycle, 3);
    }
}
