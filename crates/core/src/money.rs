//! Fixed-point price conversion between ledger base units and display units.
//!
//! The ledger stores prices as integers with 10^8 base units per major unit.
//! Conversions go through `Decimal` so no binary floating point is involved.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::constants::{BASE_UNITS_PER_MAJOR, PRICE_SCALE};
use crate::errors::ValidationError;

/// Converts base units into a major-unit decimal (`250000000` -> `2.5`).
pub fn to_major(base_units: u64) -> Decimal {
    Decimal::from_i128_with_scale(base_units as i128, PRICE_SCALE).normalize()
}

/// Converts a major-unit decimal into base units for submission.
///
/// Digits beyond the eighth decimal place are floored away. Negative
/// amounts and amounts above `u64::MAX` base units are rejected.
pub fn to_base(major: Decimal) -> Result<u64, ValidationError> {
    if major.is_sign_negative() && !major.is_zero() {
        return Err(ValidationError::AmountOutOfRange(major.to_string()));
    }
    major
        .checked_mul(Decimal::from(BASE_UNITS_PER_MAJOR))
        .and_then(|scaled| scaled.floor().to_u64())
        .ok_or_else(|| ValidationError::AmountOutOfRange(major.to_string()))
}

/// Parses user input such as `"2.5"` into a strictly positive amount.
pub fn parse_major(input: &str) -> Result<Decimal, ValidationError> {
    let amount = Decimal::from_str(input.trim())
        .map_err(|_| ValidationError::AmountOutOfRange(input.to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(amount)
}
