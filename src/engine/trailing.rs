//! Trailing stop engine
//!
//! Per-tick stop adjustment for one open position. The stop only ever
//! tightens: break-even once the position is 0.5% in profit, then a trail
//! 0.5% of entry behind the live price once it is 1.5% in profit.

use super::position::Position;
use crate::types::Direction;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Profit fraction at which the stop moves to entry
pub const BREAK_EVEN_TRIGGER: Decimal = dec!(0.005);
/// Profit fraction at which the stop starts trailing the price
pub const TRAIL_TRIGGER: Decimal = dec!(0.015);
/// Trail distance as a fraction of the entry price
pub const TRAIL_GAP: Decimal = dec!(0.005);

/// Apply one tick of trailing logic. Returns true when the stop moved.
///
/// Extrema are updated unconditionally even when no adjustment fires. A
/// no-op tick is valid; the stop is never loosened.
pub fn apply(position: &mut Position, price: Decimal) -> bool {
    position.observe_extremes(price);

    let profit_fraction = position.profit_fraction(price);
    let entry = position.entry_price;
    let mut new_stop = position.stop_loss;

    match position.direction {
        Direction::Long => {
            // Break even: only if the current stop is below entry (or unset)
            if profit_fraction > BREAK_EVEN_TRIGGER && new_stop.is_none_or(|sl| sl < entry) {
                new_stop = Some(entry);
            }
            // Trail behind the price, adopt only a strictly higher stop
            if profit_fraction > TRAIL_TRIGGER {
                let candidate = price - entry * TRAIL_GAP;
                if new_stop.is_none_or(|sl| candidate > sl) {
                    new_stop = Some(candidate);
                }
            }
        }
        Direction::Short => {
            if profit_fraction > BREAK_EVEN_TRIGGER && new_stop.is_none_or(|sl| sl > entry) {
                new_stop = Some(entry);
            }
            if profit_fraction > TRAIL_TRIGGER {
                let candidate = price + entry * TRAIL_GAP;
                if new_stop.is_none_or(|sl| candidate < sl) {
                    new_stop = Some(candidate);
                }
            }
        }
    }

    if new_stop != position.stop_loss {
        position.stop_loss = new_stop;
        position.is_trailing = true;
        true
    } else {
        false
    }
}
