//! Market order fill simulator: deterministic slippage and commission,
//! always fills.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;
use crate::signals::SignalType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRecord {
    pub filled: bool,
    pub ticker: String,
    pub action: SignalType,
    pub date: NaiveDate,
    pub fill_price: f64,
    pub shares: u64,
    pub commission: f64,
    /// Signed: positive cost for a buy, negative (proceeds) for a sell.
    pub total_cost: f64,
    pub slippage_amount: f64,
}

/// Simulate a market order: `price * (1 ± slippage_pct)` for buy/sell,
/// commission = `fill_price * shares * commission_rate`. Always fills —
/// no partial fills, no rejection for liquidity.
pub fn simulate_fill(
    ticker: impl Into<String>,
    action: SignalType,
    date: NaiveDate,
    market_price: f64,
    shares: u64,
    commission_rate: f64,
    slippage_pct: f64,
) -> Result<FillRecord, ExecutionError> {
    if shares < 1 {
        return Err(ExecutionError::InvalidShares(shares as f64));
    }
    if market_price <= 0.0 {
        return Err(ExecutionError::NonPositivePrice(market_price));
    }
    if commission_rate < 0.0 {
        return Err(ExecutionError::NegativeCommissionRate(commission_rate));
    }
    if slippage_pct < 0.0 {
        return Err(ExecutionError::NegativeSlippage(slippage_pct));
    }

    let fill_price = match action {
        SignalType::Buy => market_price * (1.0 + slippage_pct),
        SignalType::Sell => market_price * (1.0 - slippage_pct),
    };
    let slippage_amount = (fill_price - market_price).abs();
    let commission = fill_price * shares as f64 * commission_rate;
    let total_cost = match action {
        SignalType::Buy => fill_price * shares as f64 + commission,
        SignalType::Sell => -(fill_price * shares as f64 - commission),
    };

    Ok(FillRecord {
        filled: true,
        ticker: ticker.into(),
        action,
        date,
        fill_price,
        shares,
        commission,
        total_cost,
        slippage_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[test]
    fn buy_fill_matches_published_scenario() {
        let fill = simulate_fill("005930", SignalType::Buy, d(), 50_000.0, 100, 0.00015, 0.001).unwrap();
        assert!((fill.fill_price - 50_050.0).abs() < 1e-9);
        assert!((fill.commission - 750.75).abs() < 1e-6);
        assert!((fill.total_cost - 5_005_750.75).abs() < 1e-6);
    }

    #[test]
    fn sell_fill_matches_published_scenario() {
        let fill = simulate_fill("005930", SignalType::Sell, d(), 50_000.0, 100, 0.00015, 0.001).unwrap();
        assert!((fill.fill_price - 49_950.0).abs() < 1e-9);
        assert!((fill.commission - 749.25).abs() < 1e-6);
        assert!((fill.total_cost - (-4_994_250.75)).abs() < 1e-6);
    }

    #[test]
    fn rejects_invalid_inputs() {
        assert!(matches!(simulate_fill("005930", SignalType::Buy, d(), 50_000.0, 0, 0.00015, 0.001), Err(ExecutionError::InvalidShares(_))));
        assert!(matches!(simulate_fill("005930", SignalType::Buy, d(), 0.0, 100, 0.00015, 0.001), Err(ExecutionError::NonPositivePrice(_))));
        assert!(matches!(simulate_fill("005930", SignalType::Buy, d(), 50_000.0, 100, -0.1, 0.001), Err(ExecutionError::NegativeCommissionRate(_))));
        assert!(matches!(simulate_fill("005930", SignalType::Buy, d(), 50_000.0, 100, 0.00015, -0.1), Err(ExecutionError::NegativeSlippage(_))));
    }

    #[test]
    fn always_fills() {
        let fill = simulate_fill("005930", SignalType::Buy, d(), 12_345.0, 1, 0.0, 0.0).unwrap();
        assert!(fill.filled);
    }
}
