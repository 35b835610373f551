//! Typed wrappers over the marketplace's view functions and resource.

use std::sync::Arc;

use bazaar_ledger::{LedgerQueryClient, MoveValue, ObjectReader, TupleReader};
use serde_json::json;

use super::config::MarketplaceConfig;
use super::decode::{decode_auction_item, decode_auction_tuple, decode_id_list, decode_item_tuple};
use super::model::{Auction, AuctionItemDetails, Item};
use crate::constants::{views, OWNER_PAGE_LIMIT};
use crate::errors::{DecodeError, Result};

/// Read access to one marketplace deployment.
#[derive(Clone)]
pub struct MarketplaceQueries {
    client: Arc<dyn LedgerQueryClient>,
    marketplace: MarketplaceConfig,
}

/// Move `u64` arguments are passed as decimal strings.
fn u64_arg(value: u64) -> MoveValue {
    json!(value.to_string())
}

impl MarketplaceQueries {
    pub fn new(client: Arc<dyn LedgerQueryClient>, marketplace: MarketplaceConfig) -> Self {
        Self {
            client,
            marketplace,
        }
    }

    pub fn marketplace(&self) -> &MarketplaceConfig {
        &self.marketplace
    }

    pub fn client(&self) -> &Arc<dyn LedgerQueryClient> {
        &self.client
    }

    async fn view(&self, name: &str, mut args: Vec<MoveValue>) -> Result<Vec<MoveValue>> {
        args.insert(0, json!(self.marketplace.address));
        let function = self.marketplace.function(name);
        Ok(self.client.call_view(&function, args).await?)
    }

    pub async fn is_initialized(&self) -> Result<bool> {
        let values = self.view(views::IS_INITIALIZED, vec![]).await?;
        TupleReader::new(views::IS_INITIALIZED, &values)
            .bool(0)
            .map_err(|source| {
                DecodeError::Shape {
                    record: views::IS_INITIALIZED,
                    source,
                }
                .into()
            })
    }

    /// Raw entries of the `Marketplace` resource's item list.
    ///
    /// Entries are returned undecoded so one bad entry cannot fail the list.
    pub async fn marketplace_entries(&self) -> Result<Vec<MoveValue>> {
        let resource = self
            .client
            .read_resource(&self.marketplace.address, &self.marketplace.resource_type())
            .await?;

        let reader = ObjectReader::new("marketplace resource", &resource).map_err(|source| {
            DecodeError::Shape {
                record: "marketplace resource",
                source,
            }
        })?;
        let entries = reader.array("nfts").map_err(|source| DecodeError::Shape {
            record: "marketplace resource",
            source,
        })?;
        Ok(entries.to_vec())
    }

    /// First page of item ids owned by `owner`.
    pub async fn owner_item_ids(&self, owner: &str) -> Result<Vec<u64>> {
        let values = self
            .view(
                views::NFTS_FOR_OWNER,
                vec![json!(owner), u64_arg(OWNER_PAGE_LIMIT), u64_arg(0)],
            )
            .await?;
        Ok(decode_id_list(views::NFTS_FOR_OWNER, &values)?)
    }

    pub async fn item(&self, id: u64) -> Result<Item> {
        let values = self.view(views::NFT_DETAILS, vec![u64_arg(id)]).await?;
        Ok(decode_item_tuple(id, &values)?)
    }

    pub async fn auction_item(&self, item_id: u64) -> Result<AuctionItemDetails> {
        let values = self.view(views::NFT_DETAILS, vec![u64_arg(item_id)]).await?;
        Ok(decode_auction_item(item_id, &values)?)
    }

    pub async fn active_auction_ids(&self) -> Result<Vec<u64>> {
        let values = self.view(views::ACTIVE_AUCTIONS, vec![]).await?;
        Ok(decode_id_list(views::ACTIVE_AUCTIONS, &values)?)
    }

    pub async fn seller_auction_ids(&self, seller: &str) -> Result<Vec<u64>> {
        let values = self
            .view(views::AUCTIONS_BY_SELLER, vec![json!(seller)])
            .await?;
        Ok(decode_id_list(views::AUCTIONS_BY_SELLER, &values)?)
    }

    /// Auction tuple only, without the item join.
    pub async fn auction(&self, auction_id: u64) -> Result<Auction> {
        let values = self
            .view(views::AUCTION_DETAILS, vec![u64_arg(auction_id)])
            .await?;
        Ok(decode_auction_tuple(auction_id, &values)?)
    }

    /// Auction joined with its item's display fields.
    ///
    /// A failed join keeps the auction with `item: None`; only a failed
    /// auction read fails the record.
    pub async fn auction_with_item(&self, auction_id: u64) -> Result<Auction> {
        let mut auction = self.auction(auction_id).await?;
        match self.auction_item(auction.item_id).await {
            Ok(details) => auction.item = Some(details),
            Err(e) => log::warn!(
                "Auction {}: item {} details unavailable: {}",
                auction_id,
                auction.item_id,
                e
            ),
        }
        Ok(auction)
    }
}
