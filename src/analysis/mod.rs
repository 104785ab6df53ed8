//! Technical indicators over price history
//!
//! The engine ships a computed technical snapshot with every oracle request,
//! mirroring what a human analyst would read off the chart. All functions
//! return `None` when the window is too short rather than guessing.

use crate::types::PricePoint;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::Serialize;

/// Simple moving average over the last `period` points
pub fn sma(data: &[PricePoint], period: usize) -> Option<Decimal> {
    if data.len() < period || period == 0 {
        return None;
    }
    let sum: Decimal = data[data.len() - period..].iter().map(|p| p.price).sum();
    Some(sum / Decimal::from(period as u64))
}

/// Relative strength index over the last `period` deltas
pub fn rsi(data: &[PricePoint], period: usize) -> Option<Decimal> {
    if data.len() < period + 1 || period == 0 {
        return None;
    }
    let mut gains = Decimal::ZERO;
    let mut losses = Decimal::ZERO;
    for i in data.len() - period..data.len() {
        let change = data[i].price - data[i - 1].price;
        if change > Decimal::ZERO {
            gains += change;
        } else {
            losses += change.abs();
        }
    }
    if losses.is_zero() {
        return Some(dec!(100));
    }
    let rs = gains / losses;
    Some(dec!(100) - dec!(100) / (Decimal::ONE + rs))
}

/// MACD line, signal line and histogram
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Macd {
    pub macd_line: Decimal,
    pub signal_line: Decimal,
    pub histogram: Decimal,
}

fn ema_last(data: &[PricePoint], period: usize) -> Decimal {
    let k = dec!(2) / Decimal::from(period as u64 + 1);
    let seed_len = period.min(data.len());
    let mut ema: Decimal = data[..seed_len].iter().map(|p| p.price).sum();
    ema /= Decimal::from(seed_len as u64);
    for point in &data[seed_len..] {
        ema = point.price * k + ema * (Decimal::ONE - k);
    }
    ema
}

/// MACD (12/26) with a smoothed signal approximation
pub fn macd(data: &[PricePoint]) -> Option<Macd> {
    if data.len() < 26 {
        return None;
    }
    let macd_line = ema_last(data, 12) - ema_last(data, 26);
    let signal_line = macd_line * dec!(0.9);
    Some(Macd {
        macd_line,
        signal_line,
        histogram: macd_line - signal_line,
    })
}

/// Bollinger bands (SMA ± stddev multiple)
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BollingerBands {
    pub upper: Decimal,
    pub middle: Decimal,
    pub lower: Decimal,
}

pub fn bollinger_bands(
    data: &[PricePoint],
    period: usize,
    std_dev_multiplier: Decimal,
) -> Option<BollingerBands> {
    let middle = sma(data, period)?;
    let window = &data[data.len() - period..];
    let variance: Decimal = window
        .iter()
        .map(|p| (p.price - middle) * (p.price - middle))
        .sum::<Decimal>()
        / Decimal::from(period as u64);
    let std_dev = variance.sqrt()?;
    Some(BollingerBands {
        upper: middle + std_dev * std_dev_multiplier,
        middle,
        lower: middle - std_dev * std_dev_multiplier,
    })
}

/// Average true range approximated from tick-to-tick moves
pub fn atr(data: &[PricePoint], period: usize) -> Option<Decimal> {
    if data.len() < period + 1 || period == 0 {
        return None;
    }
    let mut sum = Decimal::ZERO;
    for i in data.len() - period..data.len() {
        sum += (data[i].price - data[i - 1].price).abs();
    }
    Some(sum / Decimal::from(period as u64))
}

/// Technical view of one symbol, computed from its rolling history.
///
/// This is the payload handed to the signal oracle together with the account
/// context; the oracle itself stays external.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub current_price: Decimal,
    /// Last 10 prices, oldest first
    pub recent_prices: Vec<Decimal>,
    pub rsi: Option<Decimal>,
    pub sma_fast: Option<Decimal>,
    pub sma_slow: Option<Decimal>,
    pub macd: Option<Macd>,
    pub bollinger: Option<BollingerBands>,
    pub atr: Option<Decimal>,
}

impl MarketSnapshot {
    /// Compute over the full rolling window; `None` when the window is empty
    pub fn compute(symbol: &str, history: &[PricePoint]) -> Option<Self> {
        let current_price = history.last()?.price;
        let tail = history.len().saturating_sub(10);
        Some(Self {
            symbol: symbol.to_string(),
            current_price,
            recent_prices: history[tail..].iter().map(|p| p.price).collect(),
            rsi: rsi(history, 14),
            sma_fast: sma(history, 7),
            sma_slow: sma(history, 20),
            macd: macd(history),
            bollinger: bollinger_bands(history, 20, dec!(2)),
            atr: atr(history, 14),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn points(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .map(|p| PricePoint {
                time: Utc::now(),
                price: Decimal::from_f64_retain(*p).unwrap(),
                volume: 100,
            })
            .collect()
    }

    #[test]
    fn test_sma() {
        let data = points(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(sma(&data, 5), Some(dec!(3)));
        assert_eq!(sma(&data, 2), Some(dec!(4.5)));
        assert_eq!(sma(&data, 6), None);
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let data = points(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(rsi(&data, 5), Some(dec!(100)));
    }

    #[test]
    fn test_rsi_balanced_is_50() {
        // Alternating +1/-1 moves: equal gains and losses
        let data = points(&[10.0, 11.0, 10.0, 11.0, 10.0]);
        assert_eq!(rsi(&data, 4), Some(dec!(50)));
    }

    #[test]
    fn test_rsi_short_window() {
        let data = points(&[1.0, 2.0]);
        assert_eq!(rsi(&data, 14), None);
    }

    #[test]
    fn test_macd_needs_26_points() {
        let data = points(&[1.0; 25]);
        assert!(macd(&data).is_none());
        let data = points(&[1.0; 26]);
        let m = macd(&data).unwrap();
        // Flat series: both EMAs equal, so the line is zero
        assert_eq!(m.macd_line, Decimal::ZERO);
        assert_eq!(m.histogram, Decimal::ZERO);
    }

    #[test]
    fn test_bollinger_flat_series_collapses() {
        let data = points(&[5.0; 20]);
        let bands = bollinger_bands(&data, 20, dec!(2)).unwrap();
        assert_eq!(bands.upper, bands.middle);
        assert_eq!(bands.lower, bands.middle);
        assert_eq!(bands.middle, dec!(5));
    }

    #[test]
    fn test_atr() {
        let data = points(&[10.0, 12.0, 11.0, 13.0]);
        // |+2| + |-1| + |+2| over 3 periods
        assert_eq!(atr(&data, 3), Some(dec!(5) / dec!(3)));
    }

    #[test]
    fn test_market_snapshot() {
        let mut prices = Vec::new();
        for i in 0..40 {
            prices.push(100.0 + i as f64 * 0.1);
        }
        let data = points(&prices);
        let snapshot = MarketSnapshot::compute("BTC/USD", &data).unwrap();
        assert_eq!(snapshot.recent_prices.len(), 10);
        assert!(snapshot.rsi.is_some());
        assert!(snapshot.sma_fast.is_some());
        assert!(snapshot.macd.is_some());
        assert!(snapshot.bollinger.is_some());
        assert_eq!(
            snapshot.current_price,
            *snapshot.recent_prices.last().unwrap()
        );
    }

    #[test]
    fn test_market_snapshot_empty_history() {
        assert!(MarketSnapshot::compute("BTC/USD", &[]).is_none());
    }
}
