//! Ledger wire models
//!
//! - `types` - Address alias and zero-address sentinel handling
//! - `value` - Readers for loosely-typed view results and resource data
//! - `payload` - Entry-function payloads and transaction outcomes

mod payload;
mod types;
mod value;

pub use payload::{EntryFunctionPayload, PendingTransaction, TransactionResult, ENTRY_FUNCTION_PAYLOAD};
pub(crate) use payload::parse_micros_timestamp;
pub use types::{addresses_equal, is_zero_address, Address, ZERO_ADDRESS};
pub use value::{
    value_as_bool, value_as_u64, value_as_u64_list, MoveValue, ObjectReader, TupleReader,
};
