//! Finalization of auctions that ran past their end time.
//!
//! The ledger never closes an auction on its own: someone has to submit
//! `end_auction`. The watcher looks for auctions the last snapshot shows as
//! overdue, confirms each against the ledger, and finalizes it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use serde::Serialize;

use crate::marketplace::{ReconciliationEngine, RefreshOutcome};
use crate::transactions::{MarketplacePayloads, TransactionError};

/// Counters for one sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Overdue auctions found in the snapshot
    pub candidates: usize,
    /// Finalize transactions that succeeded
    pub finalized: usize,
    /// Already closed on the ledger, either at re-read or at submission
    pub already_inactive: usize,
    /// Skipped because another sweep is finalizing them
    pub in_flight: usize,
    pub failed: usize,
    /// Left untouched because the engine shut down mid-sweep
    pub abandoned: usize,
}

/// Auction ids with a finalize currently in progress.
type InFlight = Arc<Mutex<HashSet<u64>>>;

fn lock_in_flight(in_flight: &InFlight) -> MutexGuard<'_, HashSet<u64>> {
    in_flight.lock().unwrap_or_else(|poisoned| {
        warn!("Expiry in-flight set mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// RAII guard that marks an auction as being finalized.
/// Dropping it releases the auction, whatever the outcome.
struct FinalizeGuard {
    in_flight: InFlight,
    auction_id: u64,
}

impl FinalizeGuard {
    fn try_acquire(in_flight: &InFlight, auction_id: u64) -> Option<Self> {
        if !lock_in_flight(in_flight).insert(auction_id) {
            return None;
        }
        Some(Self {
            in_flight: in_flight.clone(),
            auction_id,
        })
    }
}

impl Drop for FinalizeGuard {
    fn drop(&mut self) {
        lock_in_flight(&self.in_flight).remove(&self.auction_id);
    }
}

enum Finalize {
    Done,
    AlreadyInactive,
    Failed,
    Abandoned,
}

pub struct ExpiryWatcher {
    engine: Arc<ReconciliationEngine>,
    payloads: MarketplacePayloads,
    in_flight: InFlight,
}

impl ExpiryWatcher {
    pub fn new(engine: Arc<ReconciliationEngine>) -> Self {
        let payloads = MarketplacePayloads::new(engine.marketplace().clone());
        Self {
            engine,
            payloads,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Finalizes every overdue auction in the current snapshot.
    ///
    /// Each auction is handled independently; one failure never stops the
    /// sweep. If there was at least one candidate, a forced refresh runs at
    /// the end so the next snapshot reflects the settlements.
    ///
    /// Once the engine is shut down no further `end_auction` is submitted;
    /// the remaining candidates are reported as abandoned and the refresh is
    /// skipped.
    pub async fn sweep(&self) -> SweepReport {
        let now = self.engine.clock().unix_now();
        let snapshot = self.engine.snapshot();
        let candidates: Vec<u64> = snapshot
            .overdue_auctions(now)
            .iter()
            .map(|a| a.auction_id)
            .collect();

        let mut report = SweepReport {
            candidates: candidates.len(),
            ..SweepReport::default()
        };
        if candidates.is_empty() {
            return report;
        }
        debug!("Expiry sweep: {} overdue auction(s)", candidates.len());

        for (index, auction_id) in candidates.iter().copied().enumerate() {
            if !self.engine.is_active() {
                report.abandoned = report.candidates - index;
                break;
            }
            let Some(_guard) = FinalizeGuard::try_acquire(&self.in_flight, auction_id) else {
                debug!("Auction {} already being finalized", auction_id);
                report.in_flight += 1;
                continue;
            };

            match self.finalize(auction_id).await {
                Finalize::Done => report.finalized += 1,
                Finalize::AlreadyInactive => report.already_inactive += 1,
                Finalize::Failed => report.failed += 1,
                Finalize::Abandoned => {
                    report.abandoned = report.candidates - index;
                    break;
                }
            }
        }

        if report.abandoned > 0 {
            info!(
                "Expiry sweep stopped by shutdown: {} finalized, {} left untouched",
                report.finalized, report.abandoned
            );
            return report;
        }

        match self.engine.refresh_forced().await {
            Ok(RefreshOutcome::Published { cycle, .. }) => {
                debug!("Post-sweep refresh published cycle {}", cycle)
            }
            Ok(_) => {}
            Err(e) => warn!("Post-sweep refresh failed: {}", e),
        }

        info!(
            "Expiry sweep: {} finalized, {} already inactive, {} failed",
            report.finalized, report.already_inactive, report.failed
        );
        report
    }

    async fn finalize(&self, auction_id: u64) -> Finalize {
        // The snapshot may be stale; only act on what the ledger says now
        match self.engine.queries().auction(auction_id).await {
            Ok(auction) if !auction.is_active => {
                debug!("Auction {} already inactive on the ledger", auction_id);
                return Finalize::AlreadyInactive;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Auction {}: re-read failed, not finalizing: {}", auction_id, e);
                return Finalize::Failed;
            }
        }

        // No new writes once the engine is torn down
        if !self.engine.is_active() {
            debug!("Auction {}: engine shut down, not finalizing", auction_id);
            return Finalize::Abandoned;
        }

        let payload = self.payloads.end_auction(auction_id);
        match self.engine.queries().client().submit_and_await(payload).await {
            Ok(result) => {
                info!("Auction {} finalized in {}", auction_id, result.hash);
                Finalize::Done
            }
            Err(e) => {
                let classified = TransactionError::from(&e);
                if classified.is_already_inactive() {
                    debug!("Auction {} was finalized concurrently", auction_id);
                    Finalize::AlreadyInactive
                } else {
                    warn!("Auction {}: finalize failed: {}", auction_id, classified);
                    Finalize::Failed
                }
            }
        }
    }
}
