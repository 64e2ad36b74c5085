//! Portfolio exposure accounting: per-position and aggregate risk,
//! advisory limit checks, and a reporting rollup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-share and total risk for one open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRisk {
    pub ticker: String,
    pub per_share_risk: f64,
    pub shares: u64,
    pub total_risk: f64,
}

pub fn position_risk(ticker: impl Into<String>, entry_price: f64, stop_price: f64, shares: u64) -> PositionRisk {
    let per_share_risk = (entry_price - stop_price).abs();
    PositionRisk {
        ticker: ticker.into(),
        per_share_risk,
        shares,
        total_risk: per_share_risk * shares as f64,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLimitCheck {
    pub total_risk: f64,
    pub total_risk_ratio: f64,
    pub total_risk_breached: bool,
    pub largest_single_risk: f64,
    pub largest_single_risk_ratio: f64,
    pub single_risk_breached: bool,
}

/// Advisory-only limit check: both breaches are surfaced but never
/// consulted to block an entry on the backtest path.
pub fn check_risk_limits(positions: &[PositionRisk], equity: f64, max_total_risk: f64, max_single_risk: f64) -> RiskLimitCheck {
    let total_risk: f64 = positions.iter().map(|p| p.total_risk).sum();
    let largest_single_risk = positions.iter().map(|p| p.total_risk).fold(0.0, f64::max);

    let total_risk_ratio = if equity > 0.0 { total_risk / equity } else { 0.0 };
    let largest_single_risk_ratio = if equity > 0.0 { largest_single_risk / equity } else { 0.0 };

    RiskLimitCheck {
        total_risk,
        total_risk_ratio,
        total_risk_breached: total_risk_ratio > max_total_risk,
        largest_single_risk,
        largest_single_risk_ratio,
        single_risk_breached: largest_single_risk_ratio > max_single_risk,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub per_ticker: HashMap<String, f64>,
    pub per_group: HashMap<String, f64>,
    pub total_risk: f64,
    pub largest_single_risk: f64,
    pub largest_single_ticker: Option<String>,
}

/// Aggregate a risk report across all open positions, optionally rolling
/// up by correlation group (`ticker -> group` map; tickers absent from
/// the map are excluded from `per_group`).
pub fn generate_risk_report(positions: &[PositionRisk], groups: Option<&HashMap<String, String>>) -> RiskReport {
    let mut per_ticker = HashMap::new();
    let mut per_group: HashMap<String, f64> = HashMap::new();
    let mut total_risk = 0.0;
    let mut largest_single_risk = 0.0;
    let mut largest_single_ticker = None;

    for p in positions {
        per_ticker.insert(p.ticker.clone(), p.total_risk);
        total_risk += p.total_risk;
        if p.total_risk > largest_single_risk {
            largest_single_risk = p.total_risk;
            largest_single_ticker = Some(p.ticker.clone());
        }
        if let Some(groups) = groups {
            if let Some(group) = groups.get(&p.ticker) {
                *per_group.entry(group.clone()).or_insert(0.0) += p.total_risk;
            }
        }
    }

    RiskReport {
        per_ticker,
        per_group,
        total_risk,
        largest_single_risk,
        largest_single_ticker,
    }
}
