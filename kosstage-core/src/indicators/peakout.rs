//! Peakout detection — trinary turn-confirmation marker on a scalar series.
//!
//! For row *t*, examine the window ending at *t* over `k + 1` rows. Emit
//! `+1` if the immediately preceding row was the window maximum and the
//! current row is strictly below it (a confirmed local high); `-1`
//! mirror-wise for a local low; else `0`. Undefined for the first `k` rows.

use super::series::Series;

/// Trinary peakout marker, modeled as `Option<i32>` so the same undefined
/// prefix discipline applies as to every other indicator column.
pub type PeakoutSeries = Vec<Option<i32>>;

pub fn peakout(values: &Series, lookback: usize) -> PeakoutSeries {
    let n = values.len();
    let mut out: PeakoutSeries = vec![None; n];
    for t in lookback..n {
        let window = &values[t - lookback..=t];
        if window.iter().any(|v| v.is_none()) {
            continue;
        }
        let prev = values[t - 1].unwrap();
        let cur = values[t].unwrap();
        let window_max = window.iter().map(|v| v.unwrap()).fold(f64::NEG_INFINITY, f64::max);
        let window_min = window.iter().map(|v| v.unwrap()).fold(f64::INFINITY, f64::min);

        if prev == window_max && cur < prev {
            out[t] = Some(1);
        } else if prev == window_min && cur > prev {
            out[t] = Some(-1);
        } else {
            out[t] = Some(0);
        }
    }
    out
}
