//! Deposit amount extraction and decimal scaling.
//!
//! The amount lookup is tied to one known event layout, the ERC-4626
//! `Deposit(address indexed sender, address indexed owner, uint256 assets,
//! uint256 shares)`: a preferred field name first, then the third declared
//! field. Other layouts only work if they use one of the preferred names.

use alloy_primitives::U256;
use chainalert_core::{event::DecodedLog, types::NormalizedValue};

/// Field names checked, in order, before falling back to position.
pub const AMOUNT_FIELD_NAMES: &[&str] = &["assets", "amount"];

/// Declaration index of the amount in the ERC-4626 `Deposit` layout.
pub const AMOUNT_FIELD_POSITION: usize = 2;

/// Locate the deposited amount in a decoded log.
///
/// A field found by name must hold a non-negative integer, otherwise there
/// is no amount. The positional fallback applies only when no preferred
/// name is declared.
pub fn deposit_amount(decoded: &DecodedLog) -> Option<U256> {
    let named = AMOUNT_FIELD_NAMES
        .iter()
        .find_map(|name| decoded.field(name));
    match named {
        Some(value) => to_u256(value),
        None => decoded.field_at(AMOUNT_FIELD_POSITION).and_then(to_u256),
    }
}

fn to_u256(value: &NormalizedValue) -> Option<U256> {
    let digits = value.as_unsigned_decimal()?;
    U256::from_str_radix(&digits, 10).ok()
}

/// Scale an integer amount by `10^decimals`.
///
/// Trailing fractional zeros are trimmed but at least one fractional digit
/// is kept: `1000000` at 6 decimals is `"1.0"`, `5` at 6 is `"0.000005"`.
/// `decimals` above 77 overflow 256 bits and are rejected upstream.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let base = U256::from(10u8).pow(U256::from(decimals));
    let whole = amount / base;
    let frac = amount % base;

    let padded = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    let trimmed = padded.trim_end_matches('0');
    let frac_str = if trimmed.is_empty() { "0" } else { trimmed };

    format!("{whole}.{frac_str}")
}
