//! Helpers for reading loosely-typed ledger values.
//!
//! View functions return a JSON tuple whose elements are strings, numbers,
//! booleans or arrays. 64-bit integers usually arrive as decimal strings
//! but some nodes emit plain numbers, so both shapes are accepted.

use serde_json::{Map, Value};

use crate::errors::LedgerError;

/// A single loosely-typed value returned by the ledger.
pub type MoveValue = Value;

/// Reads an unsigned integer from a string or number value.
pub fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Reads a boolean, accepting `"true"`/`"false"` strings as well.
pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Reads an integer list. Yields `None` for anything that is not an array of
/// integers.
pub fn value_as_u64_list(value: &Value) -> Option<Vec<u64>> {
    match value {
        Value::Array(items) => items.iter().map(value_as_u64).collect(),
        _ => None,
    }
}

fn invalid(context: &str, message: String) -> LedgerError {
    LedgerError::InvalidResponse {
        context: context.to_string(),
        message,
    }
}

/// Positional reader over a view-function result tuple.
pub struct TupleReader<'a> {
    context: &'a str,
    values: &'a [Value],
}

impl<'a> TupleReader<'a> {
    pub fn new(context: &'a str, values: &'a [Value]) -> Self {
        Self { context, values }
    }

    /// Fails unless the tuple has at least `len` elements.
    pub fn expect_len(&self, len: usize) -> Result<(), LedgerError> {
        if self.values.len() < len {
            return Err(invalid(
                self.context,
                format!("expected {} values, got {}", len, self.values.len()),
            ));
        }
        Ok(())
    }

    fn get(&self, index: usize) -> Result<&'a Value, LedgerError> {
        self.values
            .get(index)
            .ok_or_else(|| invalid(self.context, format!("missing value at index {}", index)))
    }

    pub fn u64(&self, index: usize) -> Result<u64, LedgerError> {
        let value = self.get(index)?;
        value_as_u64(value).ok_or_else(|| {
            invalid(
                self.context,
                format!("index {}: expected integer, got {}", index, value),
            )
        })
    }

    pub fn bool(&self, index: usize) -> Result<bool, LedgerError> {
        let value = self.get(index)?;
        value_as_bool(value).ok_or_else(|| {
            invalid(
                self.context,
                format!("index {}: expected bool, got {}", index, value),
            )
        })
    }

    /// Reads a string element (addresses and hex-encoded byte vectors).
    pub fn string(&self, index: usize) -> Result<String, LedgerError> {
        match self.get(index)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(invalid(
                self.context,
                format!("index {}: expected string, got {}", index, other),
            )),
        }
    }

    pub fn u64_list(&self, index: usize) -> Result<Vec<u64>, LedgerError> {
        // An empty tuple is how some nodes answer for an empty vector
        let Some(value) = self.values.get(index) else {
            return Ok(Vec::new());
        };
        value_as_u64_list(value).ok_or_else(|| {
            invalid(
                self.context,
                format!("index {}: expected integer list, got {}", index, value),
            )
        })
    }
}

/// Named-field reader over a JSON object (resource data, struct entries).
pub struct ObjectReader<'a> {
    context: &'a str,
    fields: &'a Map<String, Value>,
}

impl<'a> ObjectReader<'a> {
    pub fn new(context: &'a str, value: &'a Value) -> Result<Self, LedgerError> {
        match value {
            Value::Object(fields) => Ok(Self { context, fields }),
            other => Err(invalid(context, format!("expected object, got {}", other))),
        }
    }

    fn get(&self, key: &str) -> Result<&'a Value, LedgerError> {
        self.fields
            .get(key)
            .ok_or_else(|| invalid(self.context, format!("missing field '{}'", key)))
    }

    pub fn u64(&self, key: &str) -> Result<u64, LedgerError> {
        let value = self.get(key)?;
        value_as_u64(value).ok_or_else(|| {
            invalid(
                self.context,
                format!("field '{}': expected integer, got {}", key, value),
            )
        })
    }

    pub fn bool(&self, key: &str) -> Result<bool, LedgerError> {
        let value = self.get(key)?;
        value_as_bool(value).ok_or_else(|| {
            invalid(
                self.context,
                format!("field '{}': expected bool, got {}", key, value),
            )
        })
    }

    pub fn string(&self, key: &str) -> Result<String, LedgerError> {
        match self.get(key)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(invalid(
                self.context,
                format!("field '{}': expected string, got {}", key, other),
            )),
        }
    }

    pub fn array(&self, key: &str) -> Result<&'a [Value], LedgerError> {
        match self.get(key)? {
            Value::Array(items) => Ok(items.as_slice()),
            other => Err(invalid(
                self.context,
                format!("field '{}': expected array, got {}", key, other),
            )),
        }
    }
}
