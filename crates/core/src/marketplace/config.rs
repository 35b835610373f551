use bazaar_ledger::Address;
use serde::{Deserialize, Serialize};

use crate::constants::{MARKETPLACE_MODULE, MARKETPLACE_RESOURCE};

/// Where the marketplace module lives on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Account the module is published under (also holds the resource)
    pub address: Address,
    pub module: String,
}

impl MarketplaceConfig {
    pub fn new(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
            module: MARKETPLACE_MODULE.to_string(),
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Fully-qualified function id, e.g. `0x1::nft_marketplace::place_bid`.
    pub fn function(&self, name: &str) -> String {
        format!("{}::{}::{}", self.address, self.module, name)
    }

    pub fn resource_type(&self) -> String {
        self.function(MARKETPLACE_RESOURCE)
    }
}
