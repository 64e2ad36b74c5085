//! Stage arrangement and MACD zero-line crossing — the two ingredients
//! `determine_stage` combines into the final 1..6 label.

use crate::indicators::EnrichedTable;

/// Below this absolute gap between two EMAs, the pair is treated as tied
/// and the row's arrangement is undefined.
const NEGLECT_THRESHOLD: f64 = 1e-9;

/// The six-way arrangement of (EMA_5, EMA_20, EMA_40), or `None` on a tie
/// or any undefined input.
pub fn ma_arrangement(short: Option<f64>, mid: Option<f64>, long: Option<f64>) -> Option<i32> {
    let (s, m, l) = (short?, mid?, long?);
    if (s - m).abs() < NEGLECT_THRESHOLD
        || (m - l).abs() < NEGLECT_THRESHOLD
        || (s - l).abs() < NEGLECT_THRESHOLD
    {
        return None;
    }
    if s > m && m > l {
        Some(1)
    } else if m > s && s > l {
        Some(2)
    } else if m > l && l > s {
        Some(3)
    } else if l > m && m > s {
        Some(4)
    } else if l > s && s > m {
        Some(5)
    } else if s > l && l > m {
        Some(6)
    } else {
        None
    }
}

/// MACD zero-line crossing between consecutive rows: `+1` golden
/// (negative to positive), `-1` dead (positive to negative), else `0`.
/// Undefined input on either side yields no cross.
pub fn zero_cross(prev: Option<f64>, cur: Option<f64>) -> i32 {
    match (prev, cur) {
        (Some(p), Some(c)) if p < 0.0 && c > 0.0 => 1,
        (Some(p), Some(c)) if p > 0.0 && c < 0.0 => -1,
        _ => 0,
    }
}

/// Derive `Stage` for every row: the arrangement pattern, overridden on a
/// crossing row by the lower > middle > upper priority table. Rows with
/// neither a defined arrangement nor a firing cross are `None`.
pub fn determine_stage(table: &EnrichedTable) -> Vec<Option<i32>> {
    let n = table.len();
    let mut out = vec![None; n];
    for t in 0..n {
        let arrangement = ma_arrangement(table.ema_5[t], table.ema_20[t], table.ema_40[t]);

        let (prev_lower, prev_middle, prev_upper) = if t == 0 {
            (None, None, None)
        } else {
            (
                table.macd_lower.line[t - 1],
                table.macd_middle.line[t - 1],
                table.macd_upper.line[t - 1],
            )
        };
        let cross_lower = zero_cross(prev_lower, table.macd_lower.line[t]);
        let cross_middle = zero_cross(prev_middle, table.macd_middle.line[t]);
        let cross_upper = zero_cross(prev_upper, table.macd_upper.line[t]);

        out[t] = if cross_lower == 1 {
            Some(1)
        } else if cross_lower == -1 {
            Some(4)
        } else if cross_middle == 1 {
            Some(6)
        } else if cross_middle == -1 {
            Some(3)
        } else if cross_upper == 1 {
            Some(5)
        } else if cross_upper == -1 {
            Some(2)
        } else {
            arrangement
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrangement_stage_1() {
        assert_eq!(ma_arrangement(Some(3.0), Some(2.0), Some(1.0)), Some(1));
    }

    #[test]
    fn arrangement_stage_2() {
        assert_eq!(ma_arrangement(Some(2.0), Some(3.0), Some(1.0)), Some(2));
    }

    #[test]
    fn arrangement_stage_3() {
        assert_eq!(ma_arrangement(Some(1.0), Some(3.0), Some(2.0)), Some(3));
    }

    #[test]
    fn arrangement_stage_4() {
        assert_eq!(ma_arrangement(Some(1.0), Some(2.0), Some(3.0)), Some(4));
    }

    #[test]
    fn arrangement_stage_5() {
        assert_eq!(ma_arrangement(Some(2.0), Some(1.0), Some(3.0)), Some(5));
    }

    #[test]
    fn arrangement_stage_6() {
        assert_eq!(ma_arrangement(Some(3.0), Some(1.0), Some(2.0)), Some(6));
    }

    #[test]
    fn arrangement_tie_is_undefined() {
        assert_eq!(ma_arrangement(Some(2.0), Some(2.0), Some(1.0)), None);
    }

    #[test]
    fn arrangement_nan_input_is_undefined() {
        assert_eq!(ma_arrangement(None, Some(2.0), Some(1.0)), None);
    }

    #[test]
    fn zero_cross_golden_and_dead() {
        assert_eq!(zero_cross(Some(-1.0), Some(1.0)), 1);
        assert_eq!(zero_cross(Some(1.0), Some(-1.0)), -1);
        assert_eq!(zero_cross(Some(1.0), Some(2.0)), 0);
        assert_eq!(zero_cross(None, Some(2.0)), 0);
    }
}
