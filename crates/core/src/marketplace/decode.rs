//! Decoding of raw ledger values into domain records.
//!
//! Text fields arrive hex-encoded and are decoded leniently. Integer fields
//! go through the ledger readers, so a wrong shape fails the whole record
//! and the engine drops it.

use bazaar_ledger::{LedgerError, MoveValue, ObjectReader, TupleReader};

use super::model::{Auction, AuctionItemDetails, Item, Rarity};
use crate::codec;
use crate::errors::DecodeError;

const ITEM: &str = "item";
const AUCTION: &str = "auction";

/// Positions in the `get_nft_details` tuple.
mod item_tuple {
    pub const ID: usize = 0;
    pub const OWNER: usize = 1;
    pub const NAME: usize = 2;
    pub const DESCRIPTION: usize = 3;
    pub const URI: usize = 4;
    pub const PRICE: usize = 5;
    pub const FOR_SALE: usize = 6;
    pub const RARITY: usize = 7;
    pub const LEN: usize = 8;
}

/// Positions in the `get_auction_details` tuple.
mod auction_tuple {
    pub const ITEM_ID: usize = 0;
    pub const SELLER: usize = 1;
    pub const START_PRICE: usize = 2;
    pub const CURRENT_PRICE: usize = 3;
    pub const HIGHEST_BIDDER: usize = 4;
    pub const END_TIME: usize = 5;
    pub const IS_ACTIVE: usize = 6;
    pub const LEN: usize = 7;
}

fn field(record: &'static str, id: u64) -> impl Fn(LedgerError) -> DecodeError {
    move |source| DecodeError::Field { record, id, source }
}

fn rarity(record: &'static str, id: u64, tier: u64) -> Result<Rarity, DecodeError> {
    Rarity::from_tier(tier).ok_or(DecodeError::Rarity {
        record,
        id,
        rarity: tier,
    })
}

/// Decodes a `get_nft_details` tuple.
///
/// `requested_id` labels errors when the tuple is too short to carry its own id.
pub fn decode_item_tuple(requested_id: u64, values: &[MoveValue]) -> Result<Item, DecodeError> {
    let reader = TupleReader::new(ITEM, values);
    reader.expect_len(item_tuple::LEN).map_err(field(ITEM, requested_id))?;

    let id = reader.u64(item_tuple::ID).map_err(field(ITEM, requested_id))?;
    let err = field(ITEM, id);

    Ok(Item {
        id,
        owner: reader.string(item_tuple::OWNER).map_err(&err)?,
        name: codec::decode(&reader.string(item_tuple::NAME).map_err(&err)?),
        description: codec::decode(&reader.string(item_tuple::DESCRIPTION).map_err(&err)?),
        uri: codec::decode(&reader.string(item_tuple::URI).map_err(&err)?),
        price_units: reader.u64(item_tuple::PRICE).map_err(&err)?,
        for_sale: reader.bool(item_tuple::FOR_SALE).map_err(&err)?,
        rarity: rarity(ITEM, id, reader.u64(item_tuple::RARITY).map_err(&err)?)?,
        in_auction: false,
    })
}

/// Decodes one entry of the `Marketplace` resource's `nfts` array.
pub fn decode_item_entry(index: usize, entry: &MoveValue) -> Result<Item, DecodeError> {
    let reader = ObjectReader::new(ITEM, entry).map_err(field(ITEM, index as u64))?;
    let id = reader.u64("id").map_err(field(ITEM, index as u64))?;
    let err = field(ITEM, id);

    Ok(Item {
        id,
        owner: reader.string("owner").map_err(&err)?,
        name: codec::decode(&reader.string("name").map_err(&err)?),
        description: codec::decode(&reader.string("description").map_err(&err)?),
        uri: codec::decode(&reader.string("uri").map_err(&err)?),
        price_units: reader.u64("price").map_err(&err)?,
        for_sale: reader.bool("for_sale").map_err(&err)?,
        rarity: rarity(ITEM, id, reader.u64("rarity").map_err(&err)?)?,
        in_auction: false,
    })
}

/// Decodes a `get_auction_details` tuple. The item join is attached later.
pub fn decode_auction_tuple(
    auction_id: u64,
    values: &[MoveValue],
) -> Result<Auction, DecodeError> {
    let reader = TupleReader::new(AUCTION, values);
    let err = field(AUCTION, auction_id);
    reader.expect_len(auction_tuple::LEN).map_err(&err)?;

    Ok(Auction {
        auction_id,
        item_id: reader.u64(auction_tuple::ITEM_ID).map_err(&err)?,
        seller: reader.string(auction_tuple::SELLER).map_err(&err)?,
        start_price_units: reader.u64(auction_tuple::START_PRICE).map_err(&err)?,
        current_price_units: reader.u64(auction_tuple::CURRENT_PRICE).map_err(&err)?,
        highest_bidder: reader.string(auction_tuple::HIGHEST_BIDDER).map_err(&err)?,
        end_time: reader.u64(auction_tuple::END_TIME).map_err(&err)?,
        is_active: reader.bool(auction_tuple::IS_ACTIVE).map_err(&err)?,
        item: None,
    })
}

/// Picks the display fields out of a `get_nft_details` tuple.
pub fn decode_auction_item(
    item_id: u64,
    values: &[MoveValue],
) -> Result<AuctionItemDetails, DecodeError> {
    let item = decode_item_tuple(item_id, values)?;
    Ok(AuctionItemDetails {
        name: item.name,
        description: item.description,
        uri: item.uri,
        rarity: item.rarity,
    })
}

/// Reads the id list a membership view returns as its first element.
pub fn decode_id_list(context: &'static str, values: &[MoveValue]) -> Result<Vec<u64>, DecodeError> {
    TupleReader::new(context, values)
        .u64_list(0)
        .map_err(|source| DecodeError::Shape {
            record: context,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item_tuple(id: &str, rarity: &str) -> Vec<MoveValue> {
        vec![
            json!(id),
            json!("0xabc"),
            json!("0x4472616b65"),
            json!("0x"),
            json!("0x697066733a2f2f31"),
            json!("150000000"),
            json!(true),
            json!(rarity),
        ]
    }

    #[test]
    fn test_decode_item_tuple() {
        let item = decode_item_tuple(7, &item_tuple("7", "3")).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.owner, "0xabc");
        assert_eq!(item.name, "Drake");
        assert_eq!(item.description, "");
        assert_eq!(item.uri, "ipfs://1");
        assert_eq!(item.price_units, 150_000_000);
        assert!(item.for_sale);
        assert_eq!(item.rarity, Rarity::Rare);
        assert!(!item.in_auction);
    }

    #[test]
    fn test_item_tuple_with_bad_rarity_fails() {
        let err = decode_item_tuple(7, &item_tuple("7", "9")).unwrap_err();
        assert!(matches!(err, DecodeError::Rarity { id: 7, rarity: 9, .. }));
    }

    #[test]
    fn test_short_item_tuple_fails_with_requested_id() {
        let err = decode_item_tuple(12, &[json!("12")]).unwrap_err();
        assert!(matches!(err, DecodeError::Field { id: 12, .. }));
    }

    #[test]
    fn test_malformed_text_decodes_to_empty() {
        let mut values = item_tuple("7", "1");
        values[2] = json!("0xzz");
        let item = decode_item_tuple(7, &values).unwrap();
        assert_eq!(item.name, "");
    }

    #[test]
    fn test_decode_item_entry() {
        let entry = json!({
            "id": "4",
            "owner": "0xdef",
            "name": "0x4472616b65",
            "description": "0x",
            "uri": "0x",
            "price": 100000000,
            "for_sale": false,
            "rarity": "1"
        });
        let item = decode_item_entry(0, &entry).unwrap();
        assert_eq!(item.id, 4);
        assert_eq!(item.name, "Drake");
        assert_eq!(item.price_units, 100_000_000);
        assert!(!item.for_sale);
        assert_eq!(item.rarity, Rarity::Common);
    }

    #[test]
    fn test_item_entry_missing_field_fails() {
        let entry = json!({ "id": "4", "owner": "0xdef" });
        let err = decode_item_entry(0, &entry).unwrap_err();
        assert!(matches!(err, DecodeError::Field { id: 4, .. }));
    }

    #[test]
    fn test_decode_auction_tuple() {
        let values = vec![
            json!("9"),
            json!("0xseller"),
            json!("100000000"),
            json!("250000000"),
            json!("0x0"),
            json!("1700000300"),
            json!(true),
        ];
        let auction = decode_auction_tuple(3, &values).unwrap();
        assert_eq!(auction.auction_id, 3);
        assert_eq!(auction.item_id, 9);
        assert_eq!(auction.current_price_units, 250_000_000);
        assert_eq!(auction.end_time, 1_700_000_300);
        assert!(auction.is_active);
        assert!(!auction.has_bidder());
        assert!(auction.item.is_none());
    }

    #[test]
    fn test_auction_tuple_with_bad_integer_fails() {
        let values = vec![
            json!("9"),
            json!("0xseller"),
            json!("not a number"),
            json!("1"),
            json!("0x0"),
            json!("1"),
            json!(true),
        ];
        assert!(decode_auction_tuple(3, &values).is_err());
    }

    #[test]
    fn test_decode_id_list() {
        assert_eq!(
            decode_id_list("auctions", &[json!(["1", 2, "3"])]).unwrap(),
            vec![1, 2, 3]
        );
        assert!(decode_id_list("auctions", &[]).unwrap().is_empty());
        assert!(decode_id_list("auctions", &[json!(["x"])]).is_err());
        assert!(decode_id_list("auctions", &[json!({ "error": "garbled" })]).is_err());
    }
}
