//! Engine error types

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the lifecycle engine and its components
#[derive(Error, Debug)]
pub enum EngineError {
    /// Computed trade quantity was non-positive after rounding
    #[error("Sizing failed: balance too low for the selected risk level")]
    SizingFailed,

    /// Margin required exceeds the available wallet balance
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    /// Signal request failed or returned malformed data
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Signal is older than the freshness window
    #[error("Stale signal: generated {age_secs}s ago")]
    StaleSignal { age_secs: i64 },

    /// Symbol is not in the price feed catalog
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Position id does not exist
    #[error("Position not found: {0}")]
    PositionNotFound(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = EngineError::InsufficientFunds {
            required: dec!(550),
            available: dec!(100),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: required 550, available 100"
        );

        let err = EngineError::StaleSignal { age_secs: 20 };
        assert!(err.to_string().contains("20s"));
    }
}
