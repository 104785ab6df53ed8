//! Auto-entry gate
//!
//! Decides whether an oracle signal becomes an open request. The admission
//! checks are pure; the gate also owns the in-flight state machine that
//! keeps overlapping oracle calls from ever being launched.

use crate::config::{GateConfig, RiskConfig};
use crate::types::{EntrySource, OpenRequest, Signal};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

/// Oracle request lifecycle: at most one call may be outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    AwaitingSignal,
}

/// Why a signal was not admitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryRejection {
    /// Oracle recommends no action
    Hold,
    /// Confidence at or below the tier threshold
    LowConfidence {
        confidence: Decimal,
        threshold: Decimal,
    },
    /// Signal older than the freshness window
    Stale { age_secs: i64 },
    /// Symbol already holds the tier's maximum open positions
    SymbolAtCap { open: usize, cap: usize },
}

impl std::fmt::Display for EntryRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryRejection::Hold => write!(f, "oracle recommends HOLD"),
            EntryRejection::LowConfidence {
                confidence,
                threshold,
            } => write!(f, "confidence {confidence} at or below threshold {threshold}"),
            EntryRejection::Stale { age_secs } => {
                write!(f, "signal is {age_secs}s old")
            }
            EntryRejection::SymbolAtCap { open, cap } => {
                write!(f, "{open} open positions at cap {cap}")
            }
        }
    }
}

/// Signal admission plus oracle in-flight tracking
pub struct AutoEntryGate {
    state: GateState,
    config: GateConfig,
}

impl AutoEntryGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            state: GateState::Idle,
            config,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Claim the in-flight slot. Returns false while a request is already
    /// outstanding; the caller must not launch a second one.
    pub fn try_begin_request(&mut self) -> bool {
        match self.state {
            GateState::Idle => {
                self.state = GateState::AwaitingSignal;
                true
            }
            GateState::AwaitingSignal => false,
        }
    }

    /// Release the in-flight slot once the result has been applied
    pub fn finish_request(&mut self) {
        self.state = GateState::Idle;
    }

    /// Admission decision for one signal.
    ///
    /// Pure: no I/O, no state change. Produces either a single open request
    /// or the reason the signal was dropped.
    pub fn evaluate(
        &self,
        signal: &Signal,
        risk: &RiskConfig,
        open_on_symbol: usize,
        now: DateTime<Utc>,
    ) -> Result<OpenRequest, EntryRejection> {
        let direction = match signal.recommendation.direction() {
            Some(direction) => direction,
            None => return Err(EntryRejection::Hold),
        };

        let threshold = risk.sensitivity.confidence_threshold();
        if signal.confidence <= threshold {
            return Err(EntryRejection::LowConfidence {
                confidence: signal.confidence,
                threshold,
            });
        }

        let age_secs = signal.age_secs(now);
        if age_secs > self.config.freshness_window_secs as i64 {
            debug!("Dropping stale {} signal ({}s old)", signal.symbol, age_secs);
            return Err(EntryRejection::Stale { age_secs });
        }

        let cap = risk.account_tier.max_open_per_symbol();
        if open_on_symbol >= cap {
            return Err(EntryRejection::SymbolAtCap {
                open: open_on_symbol,
                cap,
            });
        }

        Ok(OpenRequest {
            symbol: signal.symbol.clone(),
            direction,
            stop_loss: signal.suggested_stop_loss,
            take_profit: signal.suggested_take_profit,
            source: EntrySource::Auto,
            reason: signal.reasoning.clone(),
        })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountTier, Direction, Recommendation, RiskLevel, Sensitivity};
    use rust_decimal_macros::dec;

    fn signal(confidence: Decimal, recommendation: Recommendation) -> Signal {
        Signal {
            symbol: "EUR/USD".to_string(),
            recommendation,
            confidence,
            suggested_stop_loss: Some(dec!(1.0750)),
            suggested_take_profit: Some(dec!(1.0950)),
            reasoning: "test".to_string(),
            generated_at: Utc::now(),
        }
    }

    fn free_tier() -> RiskConfig {
        RiskConfig {
            risk_level: RiskLevel::Medium,
            sensitivity: Sensitivity::Medium,
            account_tier: AccountTier::Free,
        }
    }

    fn gate() -> AutoEntryGate {
        AutoEntryGate::new(GateConfig::default())
    }

    #[test]
    fn test_hold_produces_no_request() {
        let result = gate().evaluate(
            &signal(dec!(99), Recommendation::Hold),
            &free_tier(),
            0,
            Utc::now(),
        );
        assert_eq!(result.unwrap_err(), EntryRejection::Hold);
    }

    #[test]
    fn test_confidence_84_rejected_86_admitted() {
        let gate = gate();
        let risk = free_tier();
        let now = Utc::now();

        let rejected = gate.evaluate(&signal(dec!(84), Recommendation::Buy), &risk, 0, now);
        assert!(matches!(
            rejected.unwrap_err(),
            EntryRejection::LowConfidence { .. }
        ));

        let admitted = gate
            .evaluate(&signal(dec!(86), Recommendation::Buy), &risk, 0, now)
            .unwrap();
        assert_eq!(admitted.direction, Direction::Long);
        assert_eq!(admitted.source, EntrySource::Auto);
        assert_eq!(admitted.stop_loss, Some(dec!(1.0750)));
    }

    #[test]
    fn test_confidence_at_threshold_rejected() {
        let result = gate().evaluate(
            &signal(dec!(85), Recommendation::Buy),
            &free_tier(),
            0,
            Utc::now(),
        );
        assert!(matches!(
            result.unwrap_err(),
            EntryRejection::LowConfidence { .. }
        ));
    }

    #[test]
    fn test_high_sensitivity_lowers_threshold() {
        let risk = RiskConfig {
            sensitivity: Sensitivity::High,
            account_tier: AccountTier::Pro,
            ..free_tier()
        };
        let admitted = gate().evaluate(&signal(dec!(81), Recommendation::Sell), &risk, 0, Utc::now());
        assert_eq!(admitted.unwrap().direction, Direction::Short);
    }

    #[test]
    fn test_stale_signal_rejected_despite_high_confidence() {
        let mut stale = signal(dec!(99), Recommendation::Buy);
        stale.generated_at = Utc::now() - chrono::Duration::seconds(20);

        let result = gate().evaluate(&stale, &free_tier(), 0, Utc::now());
        assert!(matches!(
            result.unwrap_err(),
            EntryRejection::Stale { age_secs } if age_secs >= 20
        ));
    }

    #[test]
    fn test_free_tier_cap_of_three() {
        let gate = gate();
        let risk = free_tier();
        let now = Utc::now();

        let under_cap = gate.evaluate(&signal(dec!(90), Recommendation::Buy), &risk, 2, now);
        assert!(under_cap.is_ok());

        let at_cap = gate.evaluate(&signal(dec!(90), Recommendation::Buy), &risk, 3, now);
        assert_eq!(
            at_cap.unwrap_err(),
            EntryRejection::SymbolAtCap { open: 3, cap: 3 }
        );
    }

    #[test]
    fn test_pro_tier_cap_of_ten() {
        let risk = RiskConfig {
            account_tier: AccountTier::Pro,
            ..free_tier()
        };
        let result = gate().evaluate(&signal(dec!(90), Recommendation::Buy), &risk, 3, Utc::now());
        assert!(result.is_ok());
    }

    #[test]
    fn test_in_flight_state_machine_refuses_overlap() {
        let mut gate = gate();
        assert_eq!(gate.state(), GateState::Idle);

        assert!(gate.try_begin_request());
        assert_eq!(gate.state(), GateState::AwaitingSignal);

        // A second launch while one is outstanding is refused
        assert!(!gate.try_begin_request());

        gate.finish_request();
        assert_eq!(gate.state(), GateState::Idle);
        assert!(gate.try_begin_request());
    }
}
