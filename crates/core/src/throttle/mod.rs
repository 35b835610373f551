//! Throttling primitives for ledger reads.
//!
//! - [`CooldownGate`]: minimum spacing between fetch cycles of one class
//! - [`ThrottledBatchExecutor`]: bounded concurrency with inter-batch pacing

mod batch;
mod cooldown;

pub use batch::{BatchStats, ThrottledBatchExecutor};
pub use cooldown::CooldownGate;
