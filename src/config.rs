//! Engine configuration
//!
//! Loaded from a TOML file with environment overrides (`NEXUS_` prefix).
//! Every section has full serde defaults so a missing or empty file yields a
//! runnable demo setup.

use crate::error::{EngineError, Result};
use crate::types::{AccountTier, RiskLevel, Sensitivity};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
}

impl Config {
    /// Load from a TOML file, with `NEXUS_*` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("NEXUS").separator("__"))
            .build()
            .map_err(|e| EngineError::Config(e.to_string()))?;

        let config: Config = cfg
            .try_deserialize()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// High risk and high sensitivity are reserved for Pro accounts
    pub fn validate(&self) -> Result<()> {
        if self.risk.account_tier == AccountTier::Free {
            if self.risk.risk_level == RiskLevel::High {
                return Err(EngineError::Config(
                    "HIGH risk level requires a PRO account".to_string(),
                ));
            }
            if self.risk.sensitivity == Sensitivity::High {
                return Err(EngineError::Config(
                    "HIGH sensitivity requires a PRO account".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Risk profile applied to every open request
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    #[serde(default = "default_risk_level")]
    pub risk_level: RiskLevel,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: Sensitivity,
    #[serde(default = "default_account_tier")]
    pub account_tier: AccountTier,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_level: default_risk_level(),
            sensitivity: default_sensitivity(),
            account_tier: default_account_tier(),
        }
    }
}

fn default_risk_level() -> RiskLevel {
    RiskLevel::Medium
}

fn default_sensitivity() -> Sensitivity {
    Sensitivity::Medium
}

fn default_account_tier() -> AccountTier {
    AccountTier::Free
}

/// Auto-entry gate parameters
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Signals older than this are dropped
    #[serde(default = "default_freshness_window")]
    pub freshness_window_secs: u64,
    /// Stop distance from entry when the oracle omits a stop (fraction)
    #[serde(default = "default_fallback_stop_pct")]
    pub fallback_stop_pct: Decimal,
    /// Target distance from entry when the oracle omits a target (fraction)
    #[serde(default = "default_fallback_target_pct")]
    pub fallback_target_pct: Decimal,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            freshness_window_secs: default_freshness_window(),
            fallback_stop_pct: default_fallback_stop_pct(),
            fallback_target_pct: default_fallback_target_pct(),
        }
    }
}

fn default_freshness_window() -> u64 {
    15
}

fn default_fallback_stop_pct() -> Decimal {
    dec!(0.01)
}

fn default_fallback_target_pct() -> Decimal {
    dec!(0.02)
}

/// Simulated price feed parameters
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Rolling history points kept per symbol
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            history_depth: default_history_depth(),
            seed: None,
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    1500
}

fn default_history_depth() -> usize {
    60
}

/// Oracle transport settings
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// Analysis endpoint; auto-trading is disabled when unset
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_oracle_timeout(),
        }
    }
}

fn default_oracle_timeout() -> u64 {
    10
}

/// Starting balances for the named wallets
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    #[serde(default = "default_demo_balance")]
    pub demo_balance: Decimal,
    #[serde(default = "default_live_balance")]
    pub live_balance: Decimal,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            demo_balance: default_demo_balance(),
            live_balance: default_live_balance(),
        }
    }
}

fn default_demo_balance() -> Decimal {
    dec!(10000)
}

fn default_live_balance() -> Decimal {
    Decimal::ZERO
}
