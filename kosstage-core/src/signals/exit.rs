//! Exit signal synthesis: three escalating levels keyed on the MACD
//! peakout and MACD-signal cross columns, direction-aware for long vs.
//! short positions.

use serde::{Deserialize, Serialize};

use crate::domain::PositionSide;
use crate::indicators::EnrichedTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitSignal {
    /// 0 (no exit pressure) through 3 (full exit).
    pub level: i32,
    /// Suggested percentage of the position to close: 0, 50, or 100.
    pub close_pct: f64,
    pub should_exit: bool,
    pub reason: String,
}

impl ExitSignal {
    fn none() -> Self {
        Self {
            level: 0,
            close_pct: 0.0,
            should_exit: false,
            reason: "no exit pressure".to_string(),
        }
    }
}

/// +1 golden cross (line crosses above signal), -1 dead cross (line
/// crosses below signal), 0 otherwise. `None` whenever either side of
/// the comparison is undefined.
fn signal_cross(prev_line: Option<f64>, prev_signal: Option<f64>, cur_line: Option<f64>, cur_signal: Option<f64>) -> Option<i32> {
    match (prev_line, prev_signal, cur_line, cur_signal) {
        (Some(pl), Some(ps), Some(cl), Some(cs)) => {
            if pl <= ps && cl > cs {
                Some(1)
            } else if pl >= ps && cl < cs {
                Some(-1)
            } else {
                Some(0)
            }
        }
        _ => None,
    }
}

/// Exit signal for `side` evaluated at row `t`. Level 1 (histogram
/// peakout turning against the position) only raises an alert; level 2
/// (MACD-line peakout) suggests closing half; level 3 (MACD crossing its
/// own signal line against the position) suggests closing in full.
/// Higher levels win when more than one fires on the same row.
pub fn exit_signal_at(table: &EnrichedTable, t: usize, side: PositionSide) -> ExitSignal {
    if t >= table.len() {
        return ExitSignal::none();
    }

    let turn_marker = match side {
        PositionSide::Long => 1,
        PositionSide::Short => -1,
    };

    let hist_fires = [table.peakout_hist_upper[t], table.peakout_hist_middle[t], table.peakout_hist_lower[t]]
        .iter()
        .any(|p| *p == Some(turn_marker));
    let line_fires = [table.peakout_line_upper[t], table.peakout_line_middle[t], table.peakout_line_lower[t]]
        .iter()
        .any(|p| *p == Some(turn_marker));

    let cross_marker = match side {
        PositionSide::Long => -1,
        PositionSide::Short => 1,
    };
    let cross_fires = if t == 0 {
        false
    } else {
        let pairs = [
            signal_cross(table.macd_upper.line[t - 1], table.macd_upper.signal[t - 1], table.macd_upper.line[t], table.macd_upper.signal[t]),
            signal_cross(table.macd_middle.line[t - 1], table.macd_middle.signal[t - 1], table.macd_middle.line[t], table.macd_middle.signal[t]),
            signal_cross(table.macd_lower.line[t - 1], table.macd_lower.signal[t - 1], table.macd_lower.line[t], table.macd_lower.signal[t]),
        ];
        pairs.iter().any(|c| *c == Some(cross_marker))
    };

    if cross_fires {
        return ExitSignal {
            level: 3,
            close_pct: 100.0,
            should_exit: true,
            reason: "MACD line crossed its signal against the position".to_string(),
        };
    }
    if line_fires {
        return ExitSignal {
            level: 2,
            close_pct: 50.0,
            should_exit: true,
            reason: "MACD-line peakout turning against the position".to_string(),
        };
    }
    if hist_fires {
        return ExitSignal {
            level: 1,
            close_pct: 0.0,
            should_exit: false,
            reason: "MACD histogram peakout, alert only".to_string(),
        };
    }
    ExitSignal::none()
}

/// Exit signal for `side` at the last row of `table`, the form the
/// per-day loop actually consumes.
pub fn exit_signal_latest(table: &EnrichedTable, side: PositionSide) -> ExitSignal {
    if table.is_empty() {
        return ExitSignal::none();
    }
    exit_signal_at(table, table.len() - 1, side)
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
    fn empty_table_has_no_exit_pressure() {
        let t = table(&[]);
        let sig = exit_signal_latest(&t, PositionSide::Long);
        assert_eq!(sig.level, 0);
        assert!(!sig.should_exit);
    }

    #[test]
    fn should_exit_true_iff_level_at_least_two() {
        let closes: Vec<f64> = (0..150).map(|i| 100.0 + (i as f64 * 0.2).sin() * 15.0 + i as f64 * 0.1).collect();
        let t = table(&closes);
        for i in 0..t.len() {
            for side in [PositionSide::Long, PositionSide::Short] {
                let sig = exit_signal_at(&t, i, side);
                assert_eq!(sig.should_exit, sig.level >= 2);
            }
        }
    }

    #[test]
    fn close_pct_matches_level() {
        let closes: Vec<f64> = (0..150).map(|i| 100.0 + (i as f64 * 0.25).sin() * 12.0).collect();
        let t = table(&closes);
        for i in 0..t.len() {
            let sig = exit_signal_at(&t, i, PositionSide::Long);
            match sig.level {
                0 => assert_eq!(sig.close_pct, 0.0),
                1 => assert_eq!(sig.close_pct, 0.0),
                2 => assert_eq!(sig.close_pct, 50.0),
                3 => assert_eq!(sig.close_pct, 100.0),
                other => panic!("unexpected level {other}"),
            }
        }
    }
}
