//! Risk manager: Turtle sizing, strength scaling, capital caps, dual
//! stop-loss derivation, trailing stops, and exposure accounting.

pub mod exposure;
pub mod sizing;
pub mod stops;

use serde::{Deserialize, Serialize};

pub use exposure::{check_risk_limits, generate_risk_report, position_risk, PositionRisk, RiskLimitCheck, RiskReport};
pub use sizing::{apply_strength_adjustment, calculate_unit_size, capital_cap, final_entry_size, strength_multiplier};
pub use stops::{combined_stop, trailing_stop_update, trend_stop, volatility_stop, CombinedStop};

use crate::domain::{PositionSide, StopType};
use crate::signals::SignalType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub risk_percentage: f64,
    pub strength_threshold: f64,
    pub atr_multiplier: f64,
    pub stop_ma: String,
    pub max_capital_ratio: f64,
    pub max_total_risk: f64,
    pub max_single_risk: f64,
    pub skip_portfolio_limits: bool,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_percentage: 0.01,
            strength_threshold: 80.0,
            atr_multiplier: 2.0,
            stop_ma: "EMA_20".to_string(),
            max_capital_ratio: 0.25,
            max_total_risk: 0.02,
            max_single_risk: 0.01,
            skip_portfolio_limits: true,
        }
    }
}

/// A candidate entry: ticker, desired action, the signal strength that
/// produced it, and the price it would execute at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSignal {
    pub ticker: String,
    pub action: SignalType,
    pub signal_strength: f64,
    pub current_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedOrder {
    pub ticker: String,
    pub side: PositionSide,
    pub shares: u64,
    pub units: u64,
    pub stop_price: f64,
    pub stop_type: StopType,
    pub estimated_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RiskDecision {
    Approved(ApprovedOrder),
    Rejected { reason: String },
}

impl RiskDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, RiskDecision::Approved(_))
    }
}

fn rejected(reason: impl Into<String>) -> RiskDecision {
    RiskDecision::Rejected { reason: reason.into() }
}

/// The integrated entry check: derives a side, sizes via Turtle risk
/// scaled by signal strength and capped by capital, derives the combined
/// stop, and verifies cash sufficiency for a long entry (at the
/// execution simulator's buy-side cost formula). Portfolio-wide unit
/// caps (`check_risk_limits` / `generate_risk_report`) are intentionally
/// not consulted here; they are advisory and computed separately.
#[allow(clippy::too_many_arguments)]
pub fn apply_risk_management(
    signal: &RiskSignal,
    account_equity: f64,
    atr: f64,
    ema_20: f64,
    commission_rate: f64,
    slippage_pct: f64,
    config: &RiskConfig,
) -> RiskDecision {
    let side = match signal.action {
        SignalType::Buy => PositionSide::Long,
        SignalType::Sell => PositionSide::Short,
    };

    let base_shares = match calculate_unit_size(account_equity, atr, config.risk_percentage) {
        Ok(s) => s,
        Err(e) => return rejected(format!("unit sizing failed: {e}")),
    };

    let adjusted_shares = match apply_strength_adjustment(base_shares, signal.signal_strength, config.strength_threshold) {
        Ok(s) => s,
        Err(e) => return rejected(format!("strength adjustment failed: {e}")),
    };

    let capped_shares = match capital_cap(account_equity, signal.current_price, config.max_capital_ratio) {
        Ok(s) => s,
        Err(e) => return rejected(format!("capital cap failed: {e}")),
    };

    let shares = final_entry_size(adjusted_shares, capped_shares);
    if shares == 0 {
        return rejected("sized to zero shares (low strength, thin capital, or excessive volatility)");
    }

    let vol_stop = match volatility_stop(signal.current_price, atr, config.atr_multiplier, side) {
        Ok(s) => s,
        Err(e) => return rejected(format!("volatility stop failed: {e}")),
    };
    let combined = combined_stop(signal.current_price, signal.current_price, side, vol_stop, trend_stop(ema_20));

    if side == PositionSide::Long {
        let fill_price = signal.current_price * (1.0 + slippage_pct);
        let commission = fill_price * shares as f64 * commission_rate;
        let cost = fill_price * shares as f64 + commission;
        if cost > account_equity {
            return rejected(format!("insufficient cash: need {cost:.2}, have {account_equity:.2}"));
        }
    }

    let estimated_risk = combined.per_share_risk * shares as f64;

    RiskDecision::Approved(ApprovedOrder {
        ticker: signal.ticker.clone(),
        side,
        shares,
        units: 1,
        stop_price: combined.stop_price,
        stop_type: combined.stop_type,
        estimated_risk,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(price: f64, strength: f64, action: SignalType) -> RiskSignal {
        RiskSignal {
            ticker: "005930".to_string(),
            action,
            signal_strength: strength,
            current_price: price,
        }
    }

    #[test]
    fn approves_a_well_sized_long_entry() {
        let config = RiskConfig::default();
        let decision = apply_risk_management(&signal(50_000.0, 90.0, SignalType::Buy), 10_000_000.0, 1_000.0, 48_500.0, 0.00015, 0.001, &config);
        match decision {
            RiskDecision::Approved(order) => {
                assert_eq!(order.shares, 100);
                assert_eq!(order.side, PositionSide::Long);
                assert_eq!(order.units, 1);
            }
            RiskDecision::Rejected { reason } => panic!("expected approval, got rejection: {reason}"),
        }
    }

    #[test]
    fn rejects_when_strength_too_low() {
        let config = RiskConfig::default();
        let decision = apply_risk_management(&signal(50_000.0, 10.0, SignalType::Buy), 10_000_000.0, 1_000.0, 48_500.0, 0.00015, 0.001, &config);
        assert!(!decision.is_approved());
    }

    #[test]
    fn rejects_when_cash_insufficient() {
        let config = RiskConfig::default();
        let decision = apply_risk_management(&signal(50_000.0, 95.0, SignalType::Buy), 60_000.0, 1_000.0, 48_500.0, 0.00015, 0.001, &config);
        assert!(!decision.is_approved());
    }
}
