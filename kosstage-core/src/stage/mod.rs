//! The stage classifier: six-stage arrangement + MACD zero-line crossing,
//! stage transitions, MA spread/slope helpers, and per-stage strategy
//! metadata.

pub mod classify;
pub mod helpers;
pub mod strategy;
pub mod transition;

pub use classify::{determine_stage, ma_arrangement, zero_cross};
pub use helpers::{ma_slope, ma_spread, DEFAULT_MA_SLOPE_WINDOW};
pub use strategy::{stage_strategy, AlignmentStrength, AlignmentSummary, RecommendedAction, RiskLevel, StageStrategy};
pub use transition::detect_stage_transition;

use crate::indicators::EnrichedTable;

/// Fill `stage`, `stage_transition`, MA spread, and MA slope columns onto
/// an already-`calculate_all_indicators`-ed table, in place. This is the
/// second half of the data manager's per-ticker wiring.
pub fn annotate(table: &mut EnrichedTable) {
    let stage = determine_stage(table);
    table.stage_transition = detect_stage_transition(&stage);
    table.stage = stage;

    let spread = ma_spread(table);
    table.spread_5_20 = spread.spread_5_20;
    table.spread_20_40 = spread.spread_20_40;
    table.spread_5_40 = spread.spread_5_40;

    let slope = ma_slope(table, DEFAULT_MA_SLOPE_WINDOW);
    table.slope_ema_5 = slope.slope_ema_5;
    table.slope_ema_20 = slope.slope_ema_20;
    table.slope_ema_40 = slope.slope_ema_40;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::calculate_all_indicators;
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
        calculate_all_indicators(bars)
    }

    #[test]
    fn annotate_fills_stage_and_transition() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.15).sin() * 8.0 + i as f64 * 0.2).collect();
        let mut t = table(&closes);
        annotate(&mut t);
        assert!(t.stage.iter().any(|s| s.is_some()));
        assert_eq!(t.stage_transition.len(), t.len());
    }

    #[test]
    fn stage_equals_arrangement_except_on_crossing_rows() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.3).collect();
        let mut t = table(&closes);
        annotate(&mut t);
        for i in 0..t.len() {
            let arrangement = ma_arrangement(t.ema_5[i], t.ema_20[i], t.ema_40[i]);
            let cross_lower = if i == 0 {
                0
            } else {
                zero_cross(t.macd_lower.line[i - 1], t.macd_lower.line[i])
            };
            let cross_middle = if i == 0 {
                0
            } else {
                zero_cross(t.macd_middle.line[i - 1], t.macd_middle.line[i])
            };
            let cross_upper = if i == 0 {
                0
            } else {
                zero_cross(t.macd_upper.line[i - 1], t.macd_upper.line[i])
            };
            if cross_lower == 0 && cross_middle == 0 && cross_upper == 0 {
                assert_eq!(t.stage[i], arrangement);
            }
        }
    }

    #[test]
    fn transition_invariant_holds() {
        let closes: Vec<f64> = (0..90).map(|i| 100.0 + (i as f64 * 0.2).cos() * 6.0).collect();
        let mut t = table(&closes);
        annotate(&mut t);
        for i in 1..t.len() {
            match (t.stage[i - 1], t.stage[i], t.stage_transition[i]) {
                (Some(p), Some(c), Some(tr)) => {
                    if p != c {
                        assert_eq!(tr, p * 10 + c);
                    } else {
                        assert_eq!(tr, 0);
                    }
                }
                (Some(_), Some(_), None) => panic!("transition undefined when both stages defined"),
                _ => {}
            }
        }
    }
}
