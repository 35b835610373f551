//! Background reconciliation for the headless server.
//!
//! Starts the core polling loops and a consumer that logs each published
//! snapshot.

use std::sync::Arc;

use bazaar_core::scheduler::{PollingScheduler, SchedulerConfig, SchedulerHandle};
use bazaar_core::MarketplaceSnapshot;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::Config;
use crate::main_lib::AppState;

pub struct BackgroundTasks {
    scheduler: SchedulerHandle,
    snapshot_logger: JoinHandle<()>,
}

impl BackgroundTasks {
    pub async fn shutdown(self) {
        self.scheduler.shutdown().await;
        self.snapshot_logger.abort();
        info!("Background tasks stopped");
    }
}

/// Starts reconciliation, the countdown cursor and, if a signer is
/// configured, the expiry sweep.
pub fn start_background_tasks(state: Arc<AppState>, config: &Config) -> BackgroundTasks {
    let scheduler_config = SchedulerConfig {
        reconcile_every: config.reconcile_interval,
        expiry_every: config.expiry_interval,
        ..SchedulerConfig::default()
    };

    let mut scheduler = PollingScheduler::new(state.engine.clone(), scheduler_config)
        .with_signal(state.signal.clone());
    if let Some(watcher) = &state.watcher {
        scheduler = scheduler.with_expiry(watcher.clone());
    }
    let handle = scheduler.start();

    let snapshots = state.engine.subscribe();
    let cursor = handle.time_cursor();
    let snapshot_logger = tokio::spawn(log_snapshots(snapshots, cursor));

    BackgroundTasks {
        scheduler: handle,
        snapshot_logger,
    }
}

fn summarize(snapshot: &MarketplaceSnapshot, now: u64) {
    if !snapshot.initialized {
        info!("Cycle {}: marketplace is not initialized", snapshot.cycle);
        return;
    }
    info!(
        "Cycle {}: {} item(s), {} buy-now, {} open auction(s), {} overdue",
        snapshot.cycle,
        snapshot.items.len(),
        snapshot.buy_now_items(None).len(),
        snapshot.open_auctions(now).len(),
        snapshot.overdue_auctions(now).len(),
    );
    for auction in snapshot.failed_auctions(now) {
        debug!(
            "Auction {} ended without bids (item {})",
            auction.auction_id, auction.item_id
        );
    }
}

async fn log_snapshots(
    mut snapshots: watch::Receiver<Arc<MarketplaceSnapshot>>,
    cursor: watch::Receiver<u64>,
) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        let now = *cursor.borrow();
        summarize(&snapshot, now);
    }
}
