use bazaar_ledger::{addresses_equal, EntryFunctionPayload, MoveValue};
use rust_decimal::Decimal;
use serde_json::json;

use crate::codec;
use crate::constants::{entries, MAX_AUCTION_DURATION_SECS, MIN_AUCTION_DURATION_SECS};
use crate::errors::ValidationError;
use crate::marketplace::{Auction, Item, MarketplaceConfig, Rarity};
use crate::money::to_base;

/// Builds entry-function payloads for the marketplace module.
///
/// Every builder validates its input first; a payload is only returned when
/// the module would plausibly accept it. All functions except `initialize`
/// take the marketplace address as their first argument.
#[derive(Clone, Debug)]
pub struct MarketplacePayloads {
    marketplace: MarketplaceConfig,
}

fn u64_arg(value: u64) -> MoveValue {
    json!(value.to_string())
}

/// Converts to base units, rejecting amounts that floor to zero.
fn positive_units(amount: Decimal) -> Result<u64, ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    match to_base(amount)? {
        0 => Err(ValidationError::NonPositiveAmount),
        units => Ok(units),
    }
}

impl MarketplacePayloads {
    pub fn new(marketplace: MarketplaceConfig) -> Self {
        Self { marketplace }
    }

    fn payload(&self, entry: &str, mut arguments: Vec<MoveValue>) -> EntryFunctionPayload {
        arguments.insert(0, json!(self.marketplace.address));
        EntryFunctionPayload::new(self.marketplace.function(entry), arguments)
    }

    /// Publishes the marketplace resource under the signer's account.
    pub fn initialize(&self) -> EntryFunctionPayload {
        EntryFunctionPayload::new(self.marketplace.function(entries::INITIALIZE), vec![])
    }

    pub fn mint_item(
        &self,
        name: &str,
        description: &str,
        uri: &str,
        rarity: u8,
    ) -> Result<EntryFunctionPayload, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if uri.trim().is_empty() {
            return Err(ValidationError::EmptyField("uri"));
        }
        let rarity = Rarity::from_tier(rarity as u64).ok_or(ValidationError::InvalidRarity(rarity))?;

        Ok(self.payload(
            entries::MINT,
            vec![
                json!(codec::encode_bytes(name)),
                json!(codec::encode_bytes(description)),
                json!(codec::encode_bytes(uri)),
                json!(rarity.tier()),
            ],
        ))
    }

    pub fn list_for_sale(
        &self,
        item_id: u64,
        price: Decimal,
    ) -> Result<EntryFunctionPayload, ValidationError> {
        let units = positive_units(price)?;
        Ok(self.payload(entries::LIST_FOR_SALE, vec![u64_arg(item_id), u64_arg(units)]))
    }

    /// Buys `item` at its listed price.
    pub fn purchase(
        &self,
        item: &Item,
        buyer: &str,
    ) -> Result<EntryFunctionPayload, ValidationError> {
        if addresses_equal(&item.owner, buyer) {
            return Err(ValidationError::OwnItem);
        }
        if !item.for_sale {
            return Err(ValidationError::NotForSale);
        }
        if item.in_auction {
            return Err(ValidationError::LockedInAuction);
        }
        Ok(self.payload(
            entries::PURCHASE,
            vec![u64_arg(item.id), u64_arg(item.price_units)],
        ))
    }

    pub fn place_bid(
        &self,
        auction: &Auction,
        bid: Decimal,
        bidder: &str,
        now: u64,
    ) -> Result<EntryFunctionPayload, ValidationError> {
        let units = positive_units(bid)?;
        if units <= auction.current_price_units {
            return Err(ValidationError::BidTooLow {
                current: auction.current_price().to_string(),
            });
        }
        if auction.is_closed(now) {
            return Err(ValidationError::AuctionClosed);
        }
        if addresses_equal(&auction.seller, bidder) {
            return Err(ValidationError::SellerCannotBid);
        }
        Ok(self.payload(
            entries::PLACE_BID,
            vec![u64_arg(auction.auction_id), u64_arg(units)],
        ))
    }

    pub fn create_auction(
        &self,
        item_id: u64,
        start_price: Decimal,
        duration_secs: u64,
    ) -> Result<EntryFunctionPayload, ValidationError> {
        if !(MIN_AUCTION_DURATION_SECS..=MAX_AUCTION_DURATION_SECS).contains(&duration_secs) {
            return Err(ValidationError::InvalidDuration {
                min: MIN_AUCTION_DURATION_SECS,
                max: MAX_AUCTION_DURATION_SECS,
                got: duration_secs,
            });
        }
        let units = positive_units(start_price)?;
        Ok(self.payload(
            entries::CREATE_AUCTION,
            vec![u64_arg(item_id), u64_arg(units), u64_arg(duration_secs)],
        ))
    }

    /// Settles an auction. Anyone may submit it once the end time has passed.
    pub fn end_auction(&self, auction_id: u64) -> EntryFunctionPayload {
        self.payload(entries::END_AUCTION, vec![u64_arg(auction_id)])
    }
}
