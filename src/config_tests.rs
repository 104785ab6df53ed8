//! Tests for configuration

#[cfg(test)]
mod tests {
    use super::super::config::*;
    use crate::types::{AccountTier, RiskLevel, Sensitivity};
    use rust_decimal_macros::dec;

    #[test]
    fn test_config_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.risk.risk_level, RiskLevel::Medium);
        assert_eq!(config.risk.sensitivity, Sensitivity::Medium);
        assert_eq!(config.risk.account_tier, AccountTier::Free);
        assert_eq!(config.gate.freshness_window_secs, 15);
        assert_eq!(config.feed.tick_interval_ms, 1500);
        assert_eq!(config.feed.history_depth, 60);
        assert!(config.oracle.endpoint.is_none());
        assert_eq!(config.wallet.demo_balance, dec!(10000));
        assert_eq!(config.wallet.live_balance, dec!(0));
    }

    #[test]
    fn test_gate_config_defaults() {
        let config: GateConfig = toml::from_str("").unwrap();
        assert_eq!(config.freshness_window_secs, 15);
        assert_eq!(config.fallback_stop_pct, dec!(0.01));
        assert_eq!(config.fallback_target_pct, dec!(0.02));
    }

    #[test]
    fn test_risk_config_deserialize() {
        let toml_str = r#"
risk_level = "HIGH"
sensitivity = "HIGH"
account_tier = "PRO"
"#;
        let config: RiskConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.risk_level, RiskLevel::High);
        assert_eq!(config.sensitivity, Sensitivity::High);
        assert_eq!(config.account_tier, AccountTier::Pro);
    }

    #[test]
    fn test_feed_config_deserialize() {
        let toml_str = r#"
tick_interval_ms = 500
history_depth = 120
seed = 42
"#;
        let config: FeedConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.history_depth, 120);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_oracle_config_deserialize() {
        let toml_str = r#"
endpoint = "http://localhost:9090/analyze"
timeout_secs = 5
"#;
        let config: OracleConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.endpoint,
            Some("http://localhost:9090/analyze".to_string())
        );
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_validate_rejects_high_risk_on_free_tier() {
        let toml_str = r#"
[risk]
risk_level = "HIGH"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_high_sensitivity_on_free_tier() {
        let toml_str = r#"
[risk]
sensitivity = "HIGH"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_allows_high_risk_on_pro() {
        let toml_str = r#"
[risk]
risk_level = "HIGH"
sensitivity = "HIGH"
account_tier = "PRO"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_wallet_config_deserialize() {
        let toml_str = r#"
demo_balance = 5000
live_balance = 35500
"#;
        let config: WalletConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.demo_balance, dec!(5000));
        assert_eq!(config.live_balance, dec!(35500));
    }
}
