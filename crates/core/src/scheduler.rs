//! Background loops driving reconciliation, countdowns and expiry.
//!
//! Three timers run independently of any consumer:
//! - reconciliation, once immediately and then every `reconcile_every`
//! - the time cursor, publishing the current unix second every `clock_tick_every`
//! - the expiry sweep every `expiry_every`, when a watcher is attached
//!
//! A fourth loop turns [`RefreshSignal`] notifications into refreshes.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Duration, Instant, MissedTickBehavior};

use crate::constants::{CLOCK_TICK_INTERVAL, EXPIRY_INTERVAL, RECONCILE_INTERVAL};
use crate::errors::Error;
use crate::events::RefreshSignal;
use crate::expiry::ExpiryWatcher;
use crate::marketplace::ReconciliationEngine;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub reconcile_every: Duration,
    pub clock_tick_every: Duration,
    pub expiry_every: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reconcile_every: RECONCILE_INTERVAL,
            clock_tick_every: CLOCK_TICK_INTERVAL,
            expiry_every: EXPIRY_INTERVAL,
        }
    }
}

pub struct PollingScheduler {
    engine: Arc<ReconciliationEngine>,
    watcher: Option<Arc<ExpiryWatcher>>,
    signal: RefreshSignal,
    config: SchedulerConfig,
}

/// Owns the running loops. Dropping it also stops the loops, but only
/// [`shutdown`](Self::shutdown) stops the engine from publishing.
pub struct SchedulerHandle {
    engine: Arc<ReconciliationEngine>,
    stop: watch::Sender<bool>,
    time_cursor: watch::Receiver<u64>,
    tasks: Vec<JoinHandle<()>>,
}

async fn run_refresh(engine: &ReconciliationEngine, trigger: &str) {
    match engine.refresh().await {
        Ok(outcome) => debug!("{} refresh: {:?}", trigger, outcome),
        // Already logged by the engine
        Err(Error::Uninitialized { .. }) => {}
        Err(Error::Ledger(e)) if e.retry_class().is_transient() => {
            warn!("{} refresh failed, retrying next cycle: {}", trigger, e)
        }
        Err(e) => warn!("{} refresh failed: {}", trigger, e),
    }
}

/// Shortest period a loop may run at; tokio's `interval` panics on zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

impl SchedulerConfig {
    fn clamped(self) -> Self {
        Self {
            reconcile_every: self.reconcile_every.max(MIN_PERIOD),
            clock_tick_every: self.clock_tick_every.max(MIN_PERIOD),
            expiry_every: self.expiry_every.max(MIN_PERIOD),
        }
    }
}

impl PollingScheduler {
    pub fn new(engine: Arc<ReconciliationEngine>, config: SchedulerConfig) -> Self {
        Self {
            engine,
            watcher: None,
            signal: RefreshSignal::default(),
            config: config.clamped(),
        }
    }

    pub fn with_expiry(mut self, watcher: Arc<ExpiryWatcher>) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// Listens on an existing signal instead of a private one.
    pub fn with_signal(mut self, signal: RefreshSignal) -> Self {
        self.signal = signal;
        self
    }

    pub fn signal(&self) -> RefreshSignal {
        self.signal.clone()
    }

    /// Spawns the loops on the current tokio runtime.
    pub fn start(self) -> SchedulerHandle {
        let (stop, stop_rx) = watch::channel(false);
        let (cursor_tx, time_cursor) = watch::channel(self.engine.clock().unix_now());
        let mut tasks = Vec::new();

        tasks.push(tokio::spawn(reconcile_loop(
            self.engine.clone(),
            self.config.reconcile_every,
            stop_rx.clone(),
        )));
        tasks.push(tokio::spawn(signal_loop(
            self.engine.clone(),
            self.signal.subscribe(),
            stop_rx.clone(),
        )));
        tasks.push(tokio::spawn(clock_loop(
            self.engine.clone(),
            cursor_tx,
            self.config.clock_tick_every,
            stop_rx.clone(),
        )));
        if let Some(watcher) = self.watcher {
            tasks.push(tokio::spawn(expiry_loop(
                watcher,
                self.config.expiry_every,
                stop_rx,
            )));
        }

        info!(
            "Polling scheduler started: reconcile every {:?}, {} loop(s)",
            self.config.reconcile_every,
            tasks.len()
        );
        SchedulerHandle {
            engine: self.engine,
            stop,
            time_cursor,
            tasks,
        }
    }
}

impl SchedulerHandle {
    /// Current unix second, refreshed on every clock tick.
    pub fn time_cursor(&self) -> watch::Receiver<u64> {
        self.time_cursor.clone()
    }

    /// Stops publication and all timers, then waits for the loops to exit.
    ///
    /// A cycle already in flight finishes its reads, but its snapshot is
    /// discarded.
    pub async fn shutdown(self) {
        self.engine.shutdown();
        let _ = self.stop.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("Scheduler loop ended abnormally: {}", e);
            }
        }
        info!("Polling scheduler stopped");
    }
}

async fn reconcile_loop(
    engine: Arc<ReconciliationEngine>,
    every: Duration,
    mut stop: watch::Receiver<bool>,
) {
    // First tick completes immediately
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => run_refresh(&engine, "Scheduled").await,
            _ = stop.changed() => break,
        }
    }
    debug!("Reconcile loop stopped");
}

async fn signal_loop(
    engine: Arc<ReconciliationEngine>,
    mut signals: broadcast::Receiver<()>,
    mut stop: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            received = signals.recv() => match received {
                // Missed notifications collapse into one refresh
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    run_refresh(&engine, "Signalled").await
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = stop.changed() => break,
        }
    }
    debug!("Signal loop stopped");
}

async fn clock_loop(
    engine: Arc<ReconciliationEngine>,
    cursor: watch::Sender<u64>,
    every: Duration,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                cursor.send_replace(engine.clock().unix_now());
            }
            _ = stop.changed() => break,
        }
    }
}

async fn expiry_loop(
    watcher: Arc<ExpiryWatcher>,
    every: Duration,
    mut stop: watch::Receiver<bool>,
) {
    // No sweep before the first snapshot has had a chance to land
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = watcher.sweep().await;
                if report.candidates > 0 {
                    debug!("Expiry sweep report: {:?}", report);
                }
            }
            _ = stop.changed() => break,
        }
    }
    debug!("Expiry loop stopped");
}
