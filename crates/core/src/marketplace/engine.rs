//! Reconciliation engine.
//!
//! One cycle reads the marketplace through [`MarketplaceQueries`], joins
//! items with auctions and publishes a fresh [`MarketplaceSnapshot`].
//!
//! Cycle outline:
//! 1. Enter the cooldown gate for each collection. A collection whose key is
//!    still cooling down is carried over from the previous snapshot; if both
//!    are, the cycle is skipped without touching the ledger.
//! 2. Check that the marketplace is initialized.
//! 3. Resolve auctions (throttled batches).
//! 4. Resolve items (throttled batches in owner scope).
//! 5. Derive `in_auction` from step 3 and publish, unless a newer cycle
//!    already published or the engine was shut down.
//!
//! Record-level failures drop that record and are logged. A failure of a
//! list query fails the cycle and leaves the previous snapshot in place.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bazaar_ledger::{Address, LedgerQueryClient};
use log::{debug, info, warn};
use tokio::sync::watch;

use super::config::MarketplaceConfig;
use super::decode::decode_item_entry;
use super::model::{Auction, Item};
use super::queries::MarketplaceQueries;
use super::snapshot::MarketplaceSnapshot;
use crate::constants::{
    BATCH_SIZE, FETCH_AUCTIONS_KEY, FETCH_COOLDOWN, FETCH_ITEMS_KEY, INTER_BATCH_DELAY,
};
use crate::errors::{Error, Result};
use crate::throttle::{CooldownGate, ThrottledBatchExecutor};
use crate::utils::Clock;

/// Which slice of the marketplace a view reconciles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewScope {
    /// Every listed item and every active auction, with item details joined
    Marketplace,
    /// Items owned by, and auctions created by, one account
    Owner(Address),
}

/// Pacing knobs for the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub cooldown: Duration,
    pub batch_size: usize,
    pub inter_batch_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown: FETCH_COOLDOWN,
            batch_size: BATCH_SIZE,
            inter_batch_delay: INTER_BATCH_DELAY,
        }
    }
}

/// What a call to [`ReconciliationEngine::refresh`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Both collections were cooling down; nothing was fetched.
    Skipped,
    /// A new snapshot was published.
    Published {
        cycle: u64,
        items: usize,
        auctions: usize,
        /// Records dropped because they failed to load or decode
        dropped: usize,
    },
    /// The cycle completed but its result was thrown away, either because a
    /// newer cycle had already published or because the engine was shut down.
    Discarded { cycle: u64 },
}

/// Records that made it into a cycle plus how many were dropped on the way.
struct Resolved<T> {
    records: Vec<T>,
    dropped: usize,
}

impl<T> Resolved<T> {
    fn carried(records: Vec<T>) -> Self {
        Self {
            records,
            dropped: 0,
        }
    }

    fn collect<I>(what: &str, results: I) -> Self
    where
        I: IntoIterator<Item = (u64, Result<T>)>,
    {
        let mut records = Vec::new();
        let mut dropped = 0;
        for (id, result) in results {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Dropping {} {} from this cycle: {}", what, id, e);
                    dropped += 1;
                }
            }
        }
        Self { records, dropped }
    }
}

/// Periodically rebuilds the marketplace view from the ledger.
///
/// Consumers read snapshots through [`snapshot`](Self::snapshot) or
/// [`subscribe`](Self::subscribe); only the engine writes them.
pub struct ReconciliationEngine {
    queries: MarketplaceQueries,
    scope: ViewScope,
    gate: CooldownGate,
    executor: ThrottledBatchExecutor,
    clock: Arc<dyn Clock>,
    cycle: AtomicU64,
    active: AtomicBool,
    snapshots: watch::Sender<Arc<MarketplaceSnapshot>>,
}

impl ReconciliationEngine {
    pub fn new(
        client: Arc<dyn LedgerQueryClient>,
        marketplace: MarketplaceConfig,
        scope: ViewScope,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(MarketplaceSnapshot::default()));
        Self {
            queries: MarketplaceQueries::new(client, marketplace),
            scope,
            gate: CooldownGate::new(config.cooldown, clock.clone()),
            executor: ThrottledBatchExecutor::new(config.batch_size, config.inter_batch_delay),
            clock,
            cycle: AtomicU64::new(0),
            active: AtomicBool::new(true),
            snapshots,
        }
    }

    pub fn queries(&self) -> &MarketplaceQueries {
        &self.queries
    }

    pub fn marketplace(&self) -> &MarketplaceConfig {
        self.queries.marketplace()
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<MarketplaceSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<MarketplaceSnapshot>> {
        self.snapshots.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stops publication. Cycles already in flight run to completion but
    /// their results are discarded.
    pub fn shutdown(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            info!("Reconciliation engine for {} shut down", self.marketplace().address);
        }
    }

    /// Runs a cycle if the cooldown allows it.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let items_due = self.gate.try_enter(FETCH_ITEMS_KEY);
        let auctions_due = self.gate.try_enter(FETCH_AUCTIONS_KEY);

        if !items_due && !auctions_due {
            debug!("Refresh skipped: both collections are cooling down");
            return Ok(RefreshOutcome::Skipped);
        }

        self.run_cycle(items_due, auctions_due).await
    }

    /// Re-reads auctions only, carrying items over from the last snapshot.
    ///
    /// Item `in_auction` flags are still recomputed against the new auctions.
    pub async fn refresh_auctions(&self) -> Result<RefreshOutcome> {
        if !self.gate.try_enter(FETCH_AUCTIONS_KEY) {
            debug!("Auction refresh skipped: cooling down");
            return Ok(RefreshOutcome::Skipped);
        }
        self.run_cycle(false, true).await
    }

    /// Clears the cooldown and runs a full cycle.
    ///
    /// Used after a write the caller knows changed ledger state.
    pub async fn refresh_forced(&self) -> Result<RefreshOutcome> {
        self.gate.reset(FETCH_ITEMS_KEY);
        self.gate.reset(FETCH_AUCTIONS_KEY);
        self.refresh().await
    }

    async fn run_cycle(&self, items_due: bool, auctions_due: bool) -> Result<RefreshOutcome> {
        let cycle = self.cycle.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            "Cycle {} started (items: {}, auctions: {})",
            cycle, items_due, auctions_due
        );

        if !self.queries.is_initialized().await? {
            let address = self.marketplace().address.clone();
            warn!("Marketplace at {} is not initialized", address);
            self.publish(MarketplaceSnapshot::uninitialized(cycle, self.clock.now()));
            return Err(Error::Uninitialized {
                marketplace: address,
            });
        }

        let previous = self.snapshot();

        // Auctions must be settled before items can be annotated
        let auctions = if auctions_due {
            self.resolve_auctions().await?
        } else {
            Resolved::carried(previous.auctions.clone())
        };

        let items = if items_due {
            self.resolve_items().await?
        } else {
            Resolved::carried(previous.items.clone())
        };

        let dropped = items.dropped + auctions.dropped;
        let snapshot = MarketplaceSnapshot::assemble(
            cycle,
            items.records,
            auctions.records,
            self.clock.unix_now(),
            self.clock.now(),
        );
        let (item_count, auction_count) = (snapshot.items.len(), snapshot.auctions.len());

        if !self.publish(snapshot) {
            debug!("Cycle {} discarded", cycle);
            return Ok(RefreshOutcome::Discarded { cycle });
        }

        info!(
            "Cycle {} published: {} item(s), {} auction(s), {} dropped",
            cycle, item_count, auction_count, dropped
        );
        Ok(RefreshOutcome::Published {
            cycle,
            items: item_count,
            auctions: auction_count,
            dropped,
        })
    }

    /// Replaces the current snapshot if the engine is active and `snapshot`
    /// comes from a newer cycle than the one already published.
    fn publish(&self, snapshot: MarketplaceSnapshot) -> bool {
        if !self.is_active() {
            return false;
        }
        self.snapshots.send_if_modified(|current| {
            if snapshot.cycle > current.cycle {
                *current = Arc::new(snapshot);
                true
            } else {
                false
            }
        })
    }

    async fn resolve_auctions(&self) -> Result<Resolved<Auction>> {
        let (ids, joined) = match &self.scope {
            ViewScope::Marketplace => (self.queries.active_auction_ids().await?, true),
            ViewScope::Owner(owner) => (self.queries.seller_auction_ids(owner).await?, false),
        };

        let operations: Vec<_> = ids
            .iter()
            .map(|&id| async move {
                if joined {
                    self.queries.auction_with_item(id).await
                } else {
                    self.queries.auction(id).await
                }
            })
            .collect();
        let results = self.executor.run(operations).await;

        Ok(Resolved::collect("auction", ids.into_iter().zip(results)))
    }

    async fn resolve_items(&self) -> Result<Resolved<Item>> {
        match &self.scope {
            ViewScope::Marketplace => {
                let entries = self.queries.marketplace_entries().await?;
                let results = entries.iter().enumerate().map(|(index, entry)| {
                    (
                        index as u64,
                        decode_item_entry(index, entry).map_err(Error::from),
                    )
                });
                Ok(Resolved::collect("item entry", results))
            }
            ViewScope::Owner(owner) => {
                let ids = self.queries.owner_item_ids(owner).await?;
                let operations: Vec<_> = ids.iter().map(|&id| self.queries.item(id)).collect();
                let results = self.executor.run(operations).await;
                Ok(Resolved::collect("item", ids.into_iter().zip(results)))
            }
        }
    }
}
