//! Top-level configuration structs: plain, `serde`-serializable, with
//! `Default` impls pinned to the documented defaults. Loading them from a
//! file or environment is the caller's concern — this crate only models
//! the shape.

use serde::{Deserialize, Serialize};

use crate::risk::RiskConfig;
use crate::signals::FilterConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    Kospi,
    Kosdaq,
    All,
}

impl Default for Market {
    fn default() -> Self {
        Market::All
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub enable_early_signals: bool,
    /// Admission threshold consulted by the orchestrator before an
    /// approved order is even attempted, distinct from `filters.strength_threshold`
    /// which gates the per-row filter evaluation itself. Both default to
    /// 80 here, matching the admission default in the external-interfaces
    /// table rather than `FilterConfig`'s own 50.0 default.
    pub min_strength_threshold: f64,
    pub filters: FilterConfig,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            enable_early_signals: false,
            min_strength_threshold: 80.0,
            filters: FilterConfig {
                strength_threshold: 80.0,
                ..FilterConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub cache_dir: String,
    pub use_cache: bool,
    pub max_workers: usize,
    /// Calendar days of history fetched before `start_date` so the
    /// slow MACD's warm-up has produced defined values by then.
    pub lookback_pad_days: i64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            cache_dir: "cache".to_string(),
            use_cache: true,
            max_workers: 10,
            lookback_pad_days: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub risk_free_rate: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self { risk_free_rate: 0.03 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub commission_rate: f64,
    pub slippage_pct: f64,
    pub market: Market,
    pub risk: RiskConfig,
    pub signal: SignalConfig,
    pub data: DataConfig,
    pub analytics: AnalyticsConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000_000.0,
            commission_rate: 0.00015,
            slippage_pct: 0.001,
            market: Market::default(),
            risk: RiskConfig::default(),
            signal: SignalConfig::default(),
            data: DataConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = BacktestConfig::default();
        assert_eq!(config.commission_rate, 0.00015);
        assert_eq!(config.slippage_pct, 0.001);
        assert_eq!(config.market, Market::All);
        assert_eq!(config.data.max_workers, 10);
        assert!(config.data.use_cache);
        assert_eq!(config.data.lookback_pad_days, 60);
        assert_eq!(config.analytics.risk_free_rate, 0.03);
        assert!(!config.signal.enable_early_signals);
        assert_eq!(config.signal.min_strength_threshold, 80.0);
        assert_eq!(config.signal.filters.strength_threshold, 80.0);
    }

    #[test]
    fn risk_defaults_unaffected_by_signal_defaults() {
        let config = BacktestConfig::default();
        assert_eq!(config.risk.strength_threshold, 80.0);
        assert!(config.risk.skip_portfolio_limits);
    }

    #[test]
    fn serde_roundtrip() {
        let config = BacktestConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: BacktestConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
