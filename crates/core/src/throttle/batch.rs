//! Bounded-concurrency executor for independent ledger reads.
//!
//! Full nodes rate-limit bursts of concurrent queries. Reads are run in
//! groups of `batch_size`, all members of a group concurrently, with a fixed
//! pause between groups.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use log::debug;

use crate::constants::{BATCH_SIZE, INTER_BATCH_DELAY};

/// Counters describing one executor run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub batches: usize,
    pub delays: usize,
    pub failures: usize,
}

/// Runs operations in paced groups and returns results in input order.
#[derive(Clone, Debug)]
pub struct ThrottledBatchExecutor {
    batch_size: usize,
    inter_batch_delay: Duration,
}

impl Default for ThrottledBatchExecutor {
    fn default() -> Self {
        Self::new(BATCH_SIZE, INTER_BATCH_DELAY)
    }
}

impl ThrottledBatchExecutor {
    pub fn new(batch_size: usize, inter_batch_delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            inter_batch_delay,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Runs every operation; a failed operation only fails its own slot.
    pub async fn run<Fut, T, E>(&self, operations: Vec<Fut>) -> Vec<Result<T, E>>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_with_stats(operations).await.0
    }

    /// Like [`run`](Self::run), also reporting how the work was paced.
    ///
    /// Futures are lazy, so an operation does not start until its group is
    /// polled.
    pub async fn run_with_stats<Fut, T, E>(
        &self,
        operations: Vec<Fut>,
    ) -> (Vec<Result<T, E>>, BatchStats)
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let total = operations.len();
        let mut results = Vec::with_capacity(total);
        let mut stats = BatchStats::default();
        let mut pending = operations.into_iter().peekable();

        while pending.peek().is_some() {
            let group: Vec<Fut> = pending.by_ref().take(self.batch_size).collect();
            stats.batches += 1;

            let outcomes = join_all(group).await;
            stats.failures += outcomes.iter().filter(|r| r.is_err()).count();
            results.extend(outcomes);

            if pending.peek().is_some() {
                stats.delays += 1;
                tokio::time::sleep(self.inter_batch_delay).await;
            }
        }

        if total > 0 {
            debug!(
                "Batch executor: {} operation(s) in {} group(s), {} failed",
                total, stats.batches, stats.failures
            );
        }

        (results, stats)
    }
}
