//! Signal oracle boundary
//!
//! The engine consumes BUY/SELL/HOLD signals from an external analysis
//! service; it never computes them. [`SignalOracle`] is the seam, and
//! [`HttpOracle`] the production transport. Failures degrade to an implicit
//! HOLD so an unavailable oracle can never crash the tick loop.

use crate::analysis::MarketSnapshot;
use crate::error::{EngineError, Result};
use crate::types::{Recommendation, RiskLevel, Sensitivity, Signal};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Account context shipped with every analysis request
#[derive(Debug, Clone, Serialize)]
pub struct OracleRequest<'a> {
    pub snapshot: &'a MarketSnapshot,
    pub balance: Decimal,
    pub risk_level: RiskLevel,
    pub sensitivity: Sensitivity,
}

/// Wire shape of an oracle reply
#[derive(Debug, Clone, Deserialize)]
struct OracleResponse {
    recommendation: Recommendation,
    confidence: Decimal,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    stop_loss: Option<Decimal>,
    #[serde(default)]
    take_profit: Option<Decimal>,
}

/// External market-analysis service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignalOracle: Send + Sync {
    /// Request a recommendation for one symbol
    async fn request_signal(
        &self,
        snapshot: &MarketSnapshot,
        balance: Decimal,
        risk_level: RiskLevel,
        sensitivity: Sensitivity,
    ) -> Result<Signal>;

    /// Oracle name for logging
    fn name(&self) -> &str;
}

/// Request a signal, degrading any failure to HOLD with confidence 0.
///
/// The failed request is logged and retried only on the next natural
/// analysis cadence; there is no dedicated retry loop.
pub async fn request_or_hold(
    oracle: &dyn SignalOracle,
    snapshot: &MarketSnapshot,
    balance: Decimal,
    risk_level: RiskLevel,
    sensitivity: Sensitivity,
) -> Signal {
    match oracle
        .request_signal(snapshot, balance, risk_level, sensitivity)
        .await
    {
        Ok(signal) => signal,
        Err(e) => {
            warn!("Oracle {} failed: {}", oracle.name(), e);
            Signal::hold_fallback(&snapshot.symbol, "analysis unavailable")
        }
    }
}

/// JSON-over-HTTP oracle client
pub struct HttpOracle {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOracle {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl SignalOracle for HttpOracle {
    async fn request_signal(
        &self,
        snapshot: &MarketSnapshot,
        balance: Decimal,
        risk_level: RiskLevel,
        sensitivity: Sensitivity,
    ) -> Result<Signal> {
        let request = OracleRequest {
            snapshot,
            balance,
            risk_level,
            sensitivity,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::OracleUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::OracleUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let reply: OracleResponse = response
            .json()
            .await
            .map_err(|e| EngineError::OracleUnavailable(e.to_string()))?;

        if reply.confidence < Decimal::ZERO || reply.confidence > dec!(100) {
            return Err(EngineError::OracleUnavailable(format!(
                "confidence {} out of range",
                reply.confidence
            )));
        }

        Ok(Signal {
            symbol: snapshot.symbol.clone(),
            recommendation: reply.recommendation,
            confidence: reply.confidence,
            suggested_stop_loss: reply.stop_loss,
            suggested_take_profit: reply.take_profit,
            reasoning: reply.reasoning,
            generated_at: Utc::now(),
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;

    fn snapshot() -> MarketSnapshot {
        let history = vec![PricePoint {
            time: Utc::now(),
            price: dec!(100),
            volume: 80,
        }];
        MarketSnapshot::compute("BTC/USD", &history).unwrap()
    }

    #[tokio::test]
    async fn test_request_or_hold_passes_signal_through() {
        let mut oracle = MockSignalOracle::new();
        oracle.expect_request_signal().returning(|snap, _, _, _| {
            Ok(Signal {
                symbol: snap.symbol.clone(),
                recommendation: Recommendation::Buy,
                confidence: dec!(90),
                suggested_stop_loss: Some(dec!(99)),
                suggested_take_profit: Some(dec!(103)),
                reasoning: "strong momentum".to_string(),
                generated_at: Utc::now(),
            })
        });

        let signal = request_or_hold(
            &oracle,
            &snapshot(),
            dec!(10000),
            RiskLevel::Medium,
            Sensitivity::Medium,
        )
        .await;
        assert_eq!(signal.recommendation, Recommendation::Buy);
        assert_eq!(signal.confidence, dec!(90));
    }

    #[tokio::test]
    async fn test_oracle_failure_degrades_to_hold() {
        let mut oracle = MockSignalOracle::new();
        oracle
            .expect_request_signal()
            .returning(|_, _, _, _| Err(EngineError::OracleUnavailable("timeout".to_string())));
        oracle.expect_name().return_const("mock".to_string());

        let signal = request_or_hold(
            &oracle,
            &snapshot(),
            dec!(10000),
            RiskLevel::Medium,
            Sensitivity::Medium,
        )
        .await;
        assert_eq!(signal.recommendation, Recommendation::Hold);
        assert_eq!(signal.confidence, Decimal::ZERO);
        assert_eq!(signal.symbol, "BTC/USD");
    }

    #[test]
    fn test_oracle_response_parses_minimal_payload() {
        let json = r#"{"recommendation": "SELL", "confidence": 88}"#;
        let reply: OracleResponse = serde_json::from_str(json).unwrap();
        assert_eq!(reply.recommendation, Recommendation::Sell);
        assert_eq!(reply.confidence, dec!(88));
        assert!(reply.stop_loss.is_none());
        assert!(reply.reasoning.is_empty());
    }
}
