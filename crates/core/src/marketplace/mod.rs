//! Marketplace module - domain models, ledger decoding and reconciliation.

mod config;
mod decode;
mod engine;
mod model;
mod queries;
mod snapshot;


pub use config::MarketplaceConfig;
pub use decode::{
    decode_auction_item, decode_auction_tuple, decode_id_list, decode_item_entry,
    decode_item_tuple,
};
pub use engine::{EngineConfig, ReconciliationEngine, RefreshOutcome, ViewScope};
pub use model::{Auction, AuctionItemDetails, AuctionPhase, AuctionStatus, Item, Rarity};
pub use queries::MarketplaceQueries;
pub use snapshot::{ItemFilter, MarketplaceSnapshot};
