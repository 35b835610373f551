/// Account address on the ledger (`0x`-prefixed hex).
pub type Address = String;

/// Sentinel address meaning "nobody", e.g. an auction without bids.
pub const ZERO_ADDRESS: &str = "0x0";

/// True for `0x0`, `0x00`, `0x000…` and any other all-zero spelling.
pub fn is_zero_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(digits) => !digits.is_empty() && digits.chars().all(|c| c == '0'),
        None => false,
    }
}

/// Compares two addresses ignoring hex case and leading zero padding.
pub fn addresses_equal(a: &str, b: &str) -> bool {
    fn canonical(address: &str) -> String {
        let digits = address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .unwrap_or(address);
        let trimmed = digits.trim_start_matches('0');
        trimmed.to_ascii_lowercase()
    }
    canonical(a) == canonical(b)
}
