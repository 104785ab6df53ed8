//! Closure evaluator
//!
//! Detects stop-loss / take-profit triggers for one open position and
//! computes the realized P&L. Runs after the trailing engine in the same
//! tick, so triggers are evaluated against the post-trail stop. When a
//! price jump breaches both levels at once, the stop-loss wins.

use super::position::Position;
use crate::types::Direction;
use rust_decimal::Decimal;

/// Which level fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    StopLoss,
    TakeProfit,
}

impl std::fmt::Display for CloseTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseTrigger::StopLoss => write!(f, "STOP_LOSS"),
            CloseTrigger::TakeProfit => write!(f, "TAKE_PROFIT"),
        }
    }
}

/// Check whether the live price breaches either exit level.
///
/// Stop-loss is tested first: a protective exit takes priority over a
/// target when a single tick jumps across both.
pub fn evaluate(position: &Position, price: Decimal) -> Option<CloseTrigger> {
    match position.direction {
        Direction::Long => {
            if position.stop_loss.is_some_and(|sl| price <= sl) {
                return Some(CloseTrigger::StopLoss);
            }
            if position.take_profit.is_some_and(|tp| price >= tp) {
                return Some(CloseTrigger::TakeProfit);
            }
        }
        Direction::Short => {
            if position.stop_loss.is_some_and(|sl| price >= sl) {
                return Some(CloseTrigger::StopLoss);
            }
            if position.take_profit.is_some_and(|tp| price <= tp) {
                return Some(CloseTrigger::TakeProfit);
            }
        }
    }
    None
}

/// Realized P&L for a fill at `price`
pub fn realized_pnl(position: &Position, price: Decimal) -> Decimal {
    position.unrealized_pnl(price)
}
