use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload tag for entry-function transactions.
pub const ENTRY_FUNCTION_PAYLOAD: &str = "entry_function_payload";

/// A state-changing call, handed to the wallet for signing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryFunctionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    /// Fully-qualified function id (`address::module::name`)
    pub function: String,
    pub type_arguments: Vec<String>,
    /// Positional arguments. Integers are sent as decimal strings.
    pub arguments: Vec<Value>,
}

impl EntryFunctionPayload {
    pub fn new(function: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            kind: ENTRY_FUNCTION_PAYLOAD.to_string(),
            function: function.into(),
            type_arguments: Vec::new(),
            arguments,
        }
    }
}

/// Handle returned by the wallet once a transaction has been submitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub hash: String,
}

/// Outcome of a transaction that reached finality.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub hash: String,
    /// Ledger version the transaction was committed at
    pub version: Option<u64>,
    pub success: bool,
    pub vm_status: String,
    pub committed_at: Option<DateTime<Utc>>,
}

/// Converts the node's microsecond timestamp string into a UTC instant.
pub(crate) fn parse_micros_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let micros: i64 = raw.parse().ok()?;
    Utc.timestamp_micros(micros).single()
}
