//! Per-operation cooldown gate.
//!
//! Absorbs bursts of refresh triggers (scheduled ticks, refresh signals,
//! filter changes) so that two fetch cycles of the same class never start
//! closer together than the configured interval.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::utils::Clock;

/// Timestamp guard keyed by operation class (e.g. `"fetch-items"`).
///
/// The check and the write happen under one lock, so concurrent callers for
/// the same key cannot both enter.
pub struct CooldownGate {
    /// Last successful entry per key.
    last_entry: Mutex<HashMap<String, DateTime<Utc>>>,
    min_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl CooldownGate {
    pub fn new(min_interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            last_entry: Mutex::new(HashMap::new()),
            min_interval,
            clock,
        }
    }

    /// Lock the timestamps, recovering from poison if necessary.
    ///
    /// A poisoned map at worst lets one extra fetch through.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.last_entry.lock().unwrap_or_else(|poisoned| {
            warn!("Cooldown gate mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Records an entry for `key` and returns true, unless the previous entry
    /// is more recent than the minimum interval.
    ///
    /// If the clock has stepped back past the previous entry, the window is
    /// treated as elapsed and restarts from the new time.
    pub fn try_enter(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut entries = self.lock_entries();

        if let Some(last) = entries.get(key) {
            match (now - *last).to_std() {
                Ok(elapsed) if elapsed < self.min_interval => {
                    debug!(
                        "Cooldown: '{}' entered {:?} ago, skipping (min {:?})",
                        key, elapsed, self.min_interval
                    );
                    return false;
                }
                Ok(_) => {}
                Err(_) => warn!(
                    "Cooldown: clock moved back before the last '{}' entry ({}), re-entering",
                    key, last
                ),
            }
        }

        entries.insert(key.to_string(), now);
        true
    }

    /// Time left before `key` may be entered again.
    pub fn remaining(&self, key: &str) -> Duration {
        let now = self.clock.now();
        let entries = self.lock_entries();

        match entries.get(key) {
            Some(last) => match (now - *last).to_std() {
                Ok(elapsed) => self.min_interval.saturating_sub(elapsed),
                // Clock stepped back; the next entry is allowed
                Err(_) => Duration::ZERO,
            },
            None => Duration::ZERO,
        }
    }

    pub fn last_entry(&self, key: &str) -> Option<DateTime<Utc>> {
        self.lock_entries().get(key).copied()
    }

    /// Forgets the last entry for `key` so the next `try_enter` succeeds.
    pub fn reset(&self, key: &str) {
        self.lock_entries().remove(key);
    }

    pub fn reset_all(&self) {
        self.lock_entries().clear();
    }
}
