//! Text fields cross the wire as `0x`-prefixed hex byte vectors.

/// Decodes a `0x`-prefixed hex byte vector into text.
///
/// Anything that is not `0x` followed by an even number of hex digits
/// decodes to an empty string. Invalid UTF-8 sequences are replaced with
/// U+FFFD rather than rejected.
pub fn decode(encoded: &str) -> String {
    let Some(digits) = encoded.strip_prefix("0x") else {
        return String::new();
    };
    match hex::decode(digits) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

/// Raw bytes of a text field, as submitted in mint transactions.
pub fn encode_bytes(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Encodes text in the same `0x`-prefixed form the ledger returns.
pub fn encode(text: &str) -> String {
    format!("0x{}", hex::encode(text.as_bytes()))
}
