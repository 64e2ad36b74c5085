//! Exponential Moving Average.
//!
//! Recursive: `EMA[t] = alpha * value[t] + (1 - alpha) * EMA[t-1]`.
//! Seed: `EMA[period-1] = SMA` of the first `period` values.
//! No bias adjustment. Undefined (`None`) for the first `period - 1` rows.

use super::series::Series;

/// Smoothing weight for span `period`.
pub fn alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// EMA of span `period` over a raw `f64` series (e.g. Close prices).
pub fn ema(values: &[f64], period: usize) -> Series {
    let n = values.len();
    let mut out: Series = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    let seed = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(seed);

    let a = alpha(period);
    let mut prev = seed;
    for (i, &v) in values.iter().enumerate().skip(period) {
        let cur = a * v + (1.0 - a) * prev;
        out[i] = Some(cur);
        prev = cur;
    }
    out
}

/// EMA over an already-optional series (e.g. a MACD line). The recursion
/// stalls (emits `None` and does not advance `prev`) across any `None`
/// input row, then re-seeds once `period` consecutive defined values are
/// available again.
pub fn ema_of_series(values: &Series, period: usize) -> Series {
    let n = values.len();
    let mut out: Series = vec![None; n];
    if period == 0 {
        return out;
    }

    let a = alpha(period);
    let mut run: Vec<f64> = Vec::with_capacity(period);
    let mut prev: Option<f64> = None;

    for i in 0..n {
        match values[i] {
            None => {
                run.clear();
                prev = None;
            }
            Some(v) => {
                if let Some(p) = prev {
                    let cur = a * v + (1.0 - a) * p;
                    out[i] = Some(cur);
                    prev = Some(cur);
                } else {
                    run.push(v);
                    if run.len() == period {
                        let seed = run.iter().sum::<f64>() / period as f64;
                        out[i] = Some(seed);
                        prev = Some(seed);
                    }
                }
            }
        }
    }
    out
}
