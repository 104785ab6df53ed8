//! Position sizing
//!
//! Pure calculation from wallet balance, risk fraction and entry price to a
//! trade quantity and its margin requirement. No side effects; callers are
//! responsible for reserving the margin before opening.

use crate::error::{EngineError, Result};
use rust_decimal::Decimal;

/// Quantity is rounded to this many fractional units
pub const QUANTITY_PRECISION: u32 = 6;

/// A sized open request: quantity plus the margin it will lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizedOrder {
    pub quantity: Decimal,
    pub margin: Decimal,
}

/// Size a position as `balance * risk_fraction / entry_price`.
///
/// Fails with [`EngineError::SizingFailed`] when the rounded quantity is not
/// strictly positive; the caller must not open a position in that case.
pub fn size_position(
    balance: Decimal,
    risk_fraction: Decimal,
    entry_price: Decimal,
) -> Result<SizedOrder> {
    if entry_price <= Decimal::ZERO || balance <= Decimal::ZERO {
        return Err(EngineError::SizingFailed);
    }
    let stake = balance * risk_fraction;
    let quantity = (stake / entry_price).round_dp(QUANTITY_PRECISION);
    if quantity <= Decimal::ZERO {
        return Err(EngineError::SizingFailed);
    }
    Ok(SizedOrder {
        quantity,
        margin: entry_price * quantity,
    })
}
