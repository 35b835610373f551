//! In-process notifications between writers and the reconciliation loop.

mod signal;

pub use signal::RefreshSignal;
