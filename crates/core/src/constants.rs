use std::time::Duration;

/// Move module that implements the marketplace.
pub const MARKETPLACE_MODULE: &str = "nft_marketplace";

/// Resource holding the full item list.
pub const MARKETPLACE_RESOURCE: &str = "Marketplace";

/// Base units per major display unit (octas per APT).
pub const BASE_UNITS_PER_MAJOR: u64 = 100_000_000;

/// Fixed decimal scale of prices.
pub const PRICE_SCALE: u32 = 8;

/// Concurrent reads per batch.
pub const BATCH_SIZE: usize = 5;

/// Pause between consecutive batches.
pub const INTER_BATCH_DELAY: Duration = Duration::from_millis(200);

/// Minimum spacing between two fetches of the same collection.
pub const FETCH_COOLDOWN: Duration = Duration::from_secs(5);

/// Full reconciliation period.
pub const RECONCILE_INTERVAL: Duration = Duration::from_secs(15);

/// Countdown cursor period.
pub const CLOCK_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Expiry sweep period.
pub const EXPIRY_INTERVAL: Duration = Duration::from_secs(30);

/// Page size for owner-scoped item id queries.
pub const OWNER_PAGE_LIMIT: u64 = 100;

/// Auction duration bounds accepted by `create_auction`.
pub const MIN_AUCTION_DURATION_SECS: u64 = 300;
pub const MAX_AUCTION_DURATION_SECS: u64 = 86_400;

/// Cooldown keys.
pub const FETCH_ITEMS_KEY: &str = "fetch-items";
pub const FETCH_AUCTIONS_KEY: &str = "fetch-auctions";

/// View functions.
pub mod views {
    pub const IS_INITIALIZED: &str = "is_marketplace_initialized";
    pub const ACTIVE_AUCTIONS: &str = "get_all_active_auctions";
    pub const AUCTION_DETAILS: &str = "get_auction_details";
    pub const NFT_DETAILS: &str = "get_nft_details";
    pub const NFTS_FOR_OWNER: &str = "get_all_nfts_for_owner";
    pub const AUCTIONS_BY_SELLER: &str = "get_auctions_by_seller";
}

/// Entry functions.
pub mod entries {
    pub const INITIALIZE: &str = "initialize";
    pub const MINT: &str = "mint_nft_to_marketplace";
    pub const LIST_FOR_SALE: &str = "list_for_sale";
    pub const PURCHASE: &str = "purchase_nft";
    pub const PLACE_BID: &str = "place_bid";
    pub const CREATE_AUCTION: &str = "create_auction";
    pub const END_AUCTION: &str = "end_auction";
}
