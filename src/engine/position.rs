//! Position record and lifecycle transitions

use crate::types::{Direction, EntrySource};
use crate::wallet::WalletKind;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One-way position state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionStatus {
    Open,
    Closed,
}

/// One simulated trade, retained forever once closed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub opened_at: DateTime<Utc>,
    pub wallet: WalletKind,
    pub source: EntrySource,
    pub entry_reason: String,

    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    /// True once the stop has been adjusted at least once
    pub is_trailing: bool,
    /// Running extrema since open
    pub highest_price: Decimal,
    pub lowest_price: Decimal,

    pub status: PositionStatus,
    pub realized_pnl: Option<Decimal>,
    pub close_price: Option<Decimal>,
    pub close_time: Option<DateTime<Utc>>,
}

impl Position {
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        symbol: &str,
        direction: Direction,
        entry_price: Decimal,
        quantity: Decimal,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
        wallet: WalletKind,
        source: EntrySource,
        entry_reason: String,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            direction,
            entry_price,
            quantity,
            opened_at,
            wallet,
            source,
            entry_reason,
            stop_loss,
            take_profit,
            is_trailing: false,
            highest_price: entry_price,
            lowest_price: entry_price,
            status: PositionStatus::Open,
            realized_pnl: None,
            close_price: None,
            close_time: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Margin locked by this position
    pub fn margin(&self) -> Decimal {
        self.entry_price * self.quantity
    }

    /// Signed P&L at the given price
    pub fn unrealized_pnl(&self, price: Decimal) -> Decimal {
        match self.direction {
            Direction::Long => (price - self.entry_price) * self.quantity,
            Direction::Short => (self.entry_price - price) * self.quantity,
        }
    }

    /// Profit as a fraction of the entry price
    pub fn profit_fraction(&self, price: Decimal) -> Decimal {
        match self.direction {
            Direction::Long => (price - self.entry_price) / self.entry_price,
            Direction::Short => (self.entry_price - price) / self.entry_price,
        }
    }

    /// Track the running extrema. Called unconditionally every tick.
    pub fn observe_extremes(&mut self, price: Decimal) {
        if price > self.highest_price {
            self.highest_price = price;
        }
        if price < self.lowest_price {
            self.lowest_price = price;
        }
    }

    /// The one-way OPEN -> CLOSED transition. Sets the closure fields
    /// exactly once; a second call is a logic error upstream.
    pub fn close(&mut self, price: Decimal, realized_pnl: Decimal, at: DateTime<Utc>) {
        debug_assert!(self.is_open(), "position closed twice");
        self.status = PositionStatus::Closed;
        self.close_price = Some(price);
        self.close_time = Some(at);
        self.realized_pnl = Some(realized_pnl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn long_at_100() -> Position {
        Position::open(
            "BTC/USD",
            Direction::Long,
            dec!(100),
            dec!(2),
            None,
            None,
            WalletKind::Demo,
            EntrySource::Manual,
            "test".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_margin() {
        assert_eq!(long_at_100().margin(), dec!(200));
    }

    #[test]
    fn test_unrealized_pnl_long() {
        let pos = long_at_100();
        assert_eq!(pos.unrealized_pnl(dec!(105)), dec!(10));
        assert_eq!(pos.unrealized_pnl(dec!(95)), dec!(-10));
    }

    #[test]
    fn test_unrealized_pnl_short() {
        let mut pos = long_at_100();
        pos.direction = Direction::Short;
        assert_eq!(pos.unrealized_pnl(dec!(95)), dec!(10));
        assert_eq!(pos.unrealized_pnl(dec!(105)), dec!(-10));
    }

    #[test]
    fn test_profit_fraction() {
        let pos = long_at_100();
        assert_eq!(pos.profit_fraction(dec!(102)), dec!(0.02));
    }

    #[test]
    fn test_extremes_monotonic() {
        let mut pos = long_at_100();
        pos.observe_extremes(dec!(110));
        pos.observe_extremes(dec!(90));
        pos.observe_extremes(dec!(100));
        assert_eq!(pos.highest_price, dec!(110));
        assert_eq!(pos.lowest_price, dec!(90));
    }

    #[test]
    fn test_close_sets_fields_once() {
        let mut pos = long_at_100();
        let at = Utc::now();
        pos.close(dec!(95), dec!(-10), at);
        assert_eq!(pos.status, PositionStatus::Closed);
        assert_eq!(pos.close_price, Some(dec!(95)));
        assert_eq!(pos.realized_pnl, Some(dec!(-10)));
        assert_eq!(pos.close_time, Some(at));
        assert!(!pos.is_open());
    }
}
