//! Signal strength scoring: a 0-100 composite of MACD alignment (0-30),
//! trend strength (0-40), and momentum (0-30), each ranked against the
//! history visible in the table it is given (never future rows, since
//! the caller is expected to pass an already-cutoff-sliced table).

use crate::indicators::direction::Direction;
use crate::indicators::EnrichedTable;

/// Slope magnitude at or above this counts as a "strong" trend leg.
const STRONG_SLOPE_THRESHOLD: f64 = 1.0;
/// Slope magnitude at or above this (but below strong) counts as a
/// plain trending leg; below it but non-zero counts as "weak".
const MODERATE_SLOPE_THRESHOLD: f64 = 0.3;
const SLOPE_EPSILON: f64 = 1e-6;

/// Fraction of `values` that are `<= target`, as a 0-100 percentile.
fn percentile_rank(values: &[f64], target: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let count_le = values.iter().filter(|v| **v <= target).count();
    100.0 * count_le as f64 / values.len() as f64
}

/// `(|EMA_5-EMA_20| + |EMA_20-EMA_40|) / close`, `None` wherever any
/// input is undefined or close is non-positive.
fn normalized_spread_at(table: &EnrichedTable, t: usize) -> Option<f64> {
    let close = table.bars[t].close;
    if close <= 0.0 {
        return None;
    }
    let s1 = table.spread_5_20[t]?;
    let s2 = table.spread_20_40[t]?;
    Some((s1.abs() + s2.abs()) / close)
}

fn macd_alignment(table: &EnrichedTable, t: usize) -> f64 {
    let dirs = [table.direction_upper[t], table.direction_middle[t], table.direction_lower[t]];
    let up = dirs.iter().filter(|d| **d == Direction::Up).count();
    let down = dirs.iter().filter(|d| **d == Direction::Down).count();
    let matching = up.max(down);
    match matching {
        3 => 30.0,
        2 => 20.0,
        1 => 10.0,
        _ => 0.0,
    }
}

fn trend_strength(table: &EnrichedTable, t: usize) -> f64 {
    let arrangement = match table.stage[t] {
        Some(6) | Some(3) => 20.0,
        Some(5) | Some(2) => 15.0,
        Some(1) | Some(4) => 5.0,
        _ => 0.0,
    };

    let spread_component = match normalized_spread_at(table, t) {
        None => 5.0,
        Some(target) => {
            let history: Vec<f64> = (0..table.len()).filter_map(|i| normalized_spread_at(table, i)).collect();
            let pct = percentile_rank(&history, target);
            if pct >= 80.0 {
                20.0
            } else if pct >= 60.0 {
                15.0
            } else if pct >= 40.0 {
                10.0
            } else {
                5.0
            }
        }
    };

    arrangement + spread_component
}

fn slope_component(slope: Option<f64>) -> f64 {
    match slope {
        None => 5.0,
        Some(v) => {
            let mag = v.abs();
            if mag >= STRONG_SLOPE_THRESHOLD {
                20.0
            } else if mag >= MODERATE_SLOPE_THRESHOLD {
                15.0
            } else if mag > SLOPE_EPSILON {
                10.0
            } else {
                0.0
            }
        }
    }
}

fn volatility_component(table: &EnrichedTable, t: usize) -> f64 {
    match table.atr[t] {
        None => 3.0,
        Some(target) => {
            let history: Vec<f64> = table.atr.iter().filter_map(|v| *v).collect();
            let pct = percentile_rank(&history, target);
            if (40.0..=70.0).contains(&pct) {
                10.0
            } else if (20.0..40.0).contains(&pct) || (70.0..=85.0).contains(&pct) {
                7.0
            } else {
                3.0
            }
        }
    }
}

fn momentum(table: &EnrichedTable, t: usize) -> f64 {
    slope_component(table.slope_ema_40[t]) + volatility_component(table, t)
}

/// Composite 0-100 strength score for row `t`.
pub fn signal_strength_at(table: &EnrichedTable, t: usize) -> f64 {
    let total = macd_alignment(table, t) + trend_strength(table, t) + momentum(table, t);
    total.clamp(0.0, 100.0)
}

/// Strength score for every row.
pub fn signal_strength_series(table: &EnrichedTable) -> Vec<f64> {
    (0..table.len()).map(|t| signal_strength_at(table, t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::calculate_all_indicators;
    use crate::stage::annotate;
    use chrono::NaiveDate;

    fn table(closes: &[f64]) -> EnrichedTable {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| crate::domain::Bar {
                date: base + chrono::Duration::days(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 1000,
            })
            .collect();
        let mut t = calculate_all_indicators(bars);
        annotate(&mut t);
        t
    }

    #[test]
    fn strength_stays_within_bounds() {
        let closes: Vec<f64> = (0..150).map(|i| 100.0 + (i as f64 * 0.1).sin() * 20.0 + i as f64 * 0.4).collect();
        let t = table(&closes);
        for s in signal_strength_series(&t) {
            assert!((0.0..=100.0).contains(&s));
        }
    }

    #[test]
    fn perfectly_aligned_strong_uptrend_scores_high() {
        let closes: Vec<f64> = (0..150).map(|i| 100.0 + i as f64 * 1.5).collect();
        let t = table(&closes);
        let last = t.len() - 1;
        let score = signal_strength_at(&t, last);
        assert!(score >= 60.0, "expected a high score for a clean strong uptrend, got {score}");
    }

    #[test]
    fn empty_series_is_empty() {
        let t = table(&[]);
        assert!(signal_strength_series(&t).is_empty());
    }
}
