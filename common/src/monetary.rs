//! Amount handling for ledger operations.
//!
//! All amounts are exact decimals. Binary floating point never touches a
//! stored amount or a running sum.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{LedgerError, Result};

/// Smallest amount the service accepts from callers (one cent).
pub const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Check that an amount is strictly positive.
pub fn ensure_positive(amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Parse an amount from its textual form.
///
/// Accepts plain decimal notation (`"150"`, `"0.25"`) as well as scientific
/// notation (`"1.5e2"`), which is how some JSON encoders emit large or tiny
/// numbers.
pub fn parse_amount(s: &str) -> std::result::Result<Decimal, rust_decimal::Error> {
    let s = s.trim();
    match Decimal::from_str(s) {
        Ok(value) => Ok(value),
        Err(_) if s.contains(['e', 'E']) => Decimal::from_scientific(s),
        Err(e) => Err(e),
    }
}
