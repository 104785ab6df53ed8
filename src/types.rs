//! Core domain types shared across the engine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Trade direction, fixed at open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Oracle recommendation for a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Recommendation {
    /// Direction a recommendation maps to; Hold maps to none
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Recommendation::Buy => Some(Direction::Long),
            Recommendation::Sell => Some(Direction::Short),
            Recommendation::Hold => None,
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Buy => write!(f, "BUY"),
            Recommendation::Sell => write!(f, "SELL"),
            Recommendation::Hold => write!(f, "HOLD"),
        }
    }
}

/// One point of simulated market history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub price: Decimal,
    pub volume: u32,
}

/// Trading signal produced by the external oracle.
///
/// The engine never mutates a signal; it either admits it through the
/// auto-entry gate or drops it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub recommendation: Recommendation,
    /// 0-100
    pub confidence: Decimal,
    pub suggested_stop_loss: Option<Decimal>,
    pub suggested_take_profit: Option<Decimal>,
    pub reasoning: String,
    pub generated_at: DateTime<Utc>,
}

impl Signal {
    /// Implicit HOLD used when the oracle fails or returns malformed data
    pub fn hold_fallback(symbol: &str, reason: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            recommendation: Recommendation::Hold,
            confidence: Decimal::ZERO,
            suggested_stop_loss: None,
            suggested_take_profit: None,
            reasoning: reason.to_string(),
            generated_at: Utc::now(),
        }
    }

    /// Seconds elapsed since the signal was generated
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.generated_at).num_seconds()
    }
}

/// How an open request reached the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntrySource {
    Manual,
    Auto,
}

/// A request to open one position, produced by the auto-entry gate or a
/// manual execution. Entry price and quantity are resolved by the lifecycle
/// engine against the live snapshot at execution time.
#[derive(Debug, Clone)]
pub struct OpenRequest {
    pub symbol: String,
    pub direction: Direction,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub source: EntrySource,
    pub reason: String,
}

impl OpenRequest {
    pub fn manual(
        symbol: &str,
        direction: Direction,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            direction,
            stop_loss,
            take_profit,
            source: EntrySource::Manual,
            reason: "manual execution".to_string(),
        }
    }
}

/// Risk appetite, maps to the fraction of balance staked per trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Fraction of wallet balance risked on one position
    pub fn risk_fraction(&self) -> Decimal {
        match self {
            RiskLevel::Low => dec!(0.01),
            RiskLevel::Medium => dec!(0.05),
            RiskLevel::High => dec!(0.10),
        }
    }
}

/// Signal sensitivity, controls the confidence bar for auto-entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sensitivity {
    Low,
    Medium,
    High,
}

impl Sensitivity {
    /// Minimum confidence a signal must exceed to be admitted
    pub fn confidence_threshold(&self) -> Decimal {
        match self {
            Sensitivity::High => dec!(80),
            _ => dec!(85),
        }
    }
}

/// Account tier, controls concurrency caps and oracle cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountTier {
    Free,
    Pro,
}

impl AccountTier {
    /// Maximum concurrently open positions per symbol
    pub fn max_open_per_symbol(&self) -> usize {
        match self {
            AccountTier::Free => 3,
            AccountTier::Pro => 10,
        }
    }

    /// Seconds between oracle analysis requests
    pub fn oracle_cadence_secs(&self) -> u64 {
        match self {
            AccountTier::Free => 20,
            AccountTier::Pro => 10,
        }
    }
}
