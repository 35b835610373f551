/// Classification for retry policy.
///
/// Ledger calls are never retried inside a cycle. Callers use this class to
/// decide how loudly to report a failure.
///
/// | Class | Next cycle may succeed? |
/// |-------|-------------------------|
/// | `NextCycle` | Yes (rate limit, timeout, node hiccup) |
/// | `Never` | No (rejected write, missing wallet) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Transient failure. The next scheduled poll is the retry.
    NextCycle,

    /// Terminal failure. Repeating the same request would fail the same way.
    Never,
}

impl RetryClass {
    pub fn is_transient(self) -> bool {
        matches!(self, Self::NextCycle)
    }
}
