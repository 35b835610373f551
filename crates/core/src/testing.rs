//! In-memory ledger used by the service tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bazaar_ledger::{
    value_as_u64, EntryFunctionPayload, LedgerError, LedgerQueryClient, MoveValue,
    TransactionResult,
};
use serde_json::{json, Value};

use crate::codec;

pub(crate) const MARKETPLACE: &str = "0xcafe";

#[derive(Default)]
pub(crate) struct MockLedgerState {
    pub initialized: bool,
    pub resource_entries: Vec<Value>,
    pub items: HashMap<u64, Vec<Value>>,
    pub auctions: HashMap<u64, Vec<Value>>,
    pub active_auction_ids: Vec<u64>,
    pub owner_item_ids: Vec<u64>,
    pub seller_auction_ids: Vec<u64>,
    /// View names that fail outright
    pub failing_views: HashSet<String>,
    /// Raw result tuples returned as-is for a view name
    pub raw_views: HashMap<String, Vec<Value>>,
    /// Every view call as `name(arg1,arg2)`
    pub view_calls: Vec<String>,
    pub resource_reads: usize,
    pub view_delay: Option<Duration>,
    pub submitted: Vec<EntryFunctionPayload>,
    /// VM status to abort every submission with
    pub abort_with: Option<String>,
}

#[derive(Clone, Default)]
pub(crate) struct MockLedgerClient {
    pub state: Arc<Mutex<MockLedgerState>>,
}

impl MockLedgerClient {
    pub fn initialized() -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().initialized = true;
        mock
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockLedgerState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    /// Lists an item both in the resource and behind `get_nft_details`.
    pub fn add_item(&self, id: u64, owner: &str, price_units: u64, for_sale: bool, rarity: u64) {
        self.with(|s| {
            s.resource_entries.push(json!({
                "id": id.to_string(),
                "owner": owner,
                "name": codec::encode(&format!("Item {}", id)),
                "description": codec::encode("test item"),
                "uri": codec::encode(&format!("ipfs://{}", id)),
                "price": price_units.to_string(),
                "for_sale": for_sale,
                "rarity": rarity.to_string(),
            }));
            s.items.insert(id, item_tuple(id, owner, price_units, for_sale, rarity));
        });
    }

    pub fn add_auction(
        &self,
        auction_id: u64,
        item_id: u64,
        seller: &str,
        bidder: &str,
        end_time: u64,
        is_active: bool,
    ) {
        self.with(|s| {
            s.auctions.insert(
                auction_id,
                vec![
                    json!(item_id.to_string()),
                    json!(seller),
                    json!("100000000"),
                    json!("150000000"),
                    json!(bidder),
                    json!(end_time.to_string()),
                    json!(is_active),
                ],
            );
            if is_active {
                s.active_auction_ids.push(auction_id);
            }
        });
    }

    pub fn view_calls(&self) -> Vec<String> {
        self.with(|s| s.view_calls.clone())
    }

    pub fn count_calls(&self, name: &str) -> usize {
        let prefix = format!("{}(", name);
        self.with(|s| s.view_calls.iter().filter(|c| c.starts_with(&prefix)).count())
    }

    pub fn submitted(&self) -> Vec<EntryFunctionPayload> {
        self.with(|s| s.submitted.clone())
    }
}

pub(crate) fn item_tuple(
    id: u64,
    owner: &str,
    price_units: u64,
    for_sale: bool,
    rarity: u64,
) -> Vec<Value> {
    vec![
        json!(id.to_string()),
        json!(owner),
        json!(codec::encode(&format!("Item {}", id))),
        json!(codec::encode("test item")),
        json!(codec::encode(&format!("ipfs://{}", id))),
        json!(price_units.to_string()),
        json!(for_sale),
        json!(rarity.to_string()),
    ]
}

fn short_name(function: &str) -> &str {
    function.rsplit("::").next().unwrap_or(function)
}

fn id_list(ids: &[u64]) -> Vec<Value> {
    vec![json!(ids.iter().map(|id| id.to_string()).collect::<Vec<_>>())]
}

#[async_trait]
impl LedgerQueryClient for MockLedgerClient {
    async fn call_view(
        &self,
        function: &str,
        args: Vec<MoveValue>,
    ) -> Result<Vec<MoveValue>, LedgerError> {
        let name = short_name(function).to_string();
        let rendered: Vec<String> = args
            .iter()
            .map(|a| a.as_str().map(str::to_string).unwrap_or_else(|| a.to_string()))
            .collect();

        let delay = self.with(|s| {
            s.view_calls.push(format!("{}({})", name, rendered.join(",")));
            s.view_delay
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let not_found = || LedgerError::ViewFailed {
            function: function.to_string(),
            message: "not found".to_string(),
        };
        let id = args.get(1).and_then(value_as_u64);

        self.with(|s| {
            if s.failing_views.contains(&name) {
                return Err(LedgerError::ViewFailed {
                    function: function.to_string(),
                    message: "injected failure".to_string(),
                });
            }
            if let Some(raw) = s.raw_views.get(&name) {
                return Ok(raw.clone());
            }
            match name.as_str() {
                "is_marketplace_initialized" => Ok(vec![json!(s.initialized)]),
                "get_all_active_auctions" => Ok(id_list(&s.active_auction_ids)),
                "get_all_nfts_for_owner" => Ok(id_list(&s.owner_item_ids)),
                "get_auctions_by_seller" => Ok(id_list(&s.seller_auction_ids)),
                "get_auction_details" => id
                    .and_then(|id| s.auctions.get(&id).cloned())
                    .ok_or_else(not_found),
                "get_nft_details" => id
                    .and_then(|id| s.items.get(&id).cloned())
                    .ok_or_else(not_found),
                _ => Err(not_found()),
            }
        })
    }

    async fn read_resource(
        &self,
        _address: &str,
        resource_type: &str,
    ) -> Result<Value, LedgerError> {
        self.with(|s| {
            s.resource_reads += 1;
            if !s.initialized {
                return Err(LedgerError::ResourceNotFound {
                    resource: resource_type.to_string(),
                });
            }
            Ok(json!({ "nfts": s.resource_entries.clone() }))
        })
    }

    async fn submit_and_await(
        &self,
        payload: EntryFunctionPayload,
    ) -> Result<TransactionResult, LedgerError> {
        self.with(|s| {
            s.submitted.push(payload.clone());
            let hash = format!("0x{:x}", s.submitted.len());

            if let Some(vm_status) = &s.abort_with {
                return Err(LedgerError::TransactionFailed {
                    hash,
                    vm_status: vm_status.clone(),
                });
            }

            // Finalizing flips the auction inactive, like the module does
            if short_name(&payload.function) == "end_auction" {
                if let Some(id) = payload.arguments.get(1).and_then(value_as_u64) {
                    if let Some(tuple) = s.auctions.get_mut(&id) {
                        tuple[6] = json!(false);
                    }
                    s.active_auction_ids.retain(|a| *a != id);
                }
            }

            Ok(TransactionResult {
                hash,
                version: Some(s.submitted.len() as u64),
                success: true,
                vm_status: "Executed successfully".to_string(),
                committed_at: None,
            })
        })
    }
}
