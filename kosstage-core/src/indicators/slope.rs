//! Least-squares slope over a rolling window.
//!
//! For each row, fit a line to the last `n` values against the integer
//! abscissa `0..n-1` and take its slope. Undefined for the first `n - 1`
//! rows. A `None` anywhere inside a window collapses the whole window's
//! output to `None`.

use super::series::Series;

pub fn slope(values: &Series, window: usize) -> Series {
    let n = values.len();
    let mut out: Series = vec![None; n];
    if window < 2 {
        return out;
    }
    let w = window as f64;
    let sum_x = (0..window).sum::<usize>() as f64;
    let sum_x2 = (0..window).map(|x| (x * x) as f64).sum::<f64>();
    let denom = w * sum_x2 - sum_x * sum_x;

    for t in (window - 1)..n {
        let win = &values[t + 1 - window..=t];
        if win.iter().any(|v| v.is_none()) {
            continue;
        }
        let sum_y: f64 = win.iter().map(|v| v.unwrap()).sum();
        let sum_xy: f64 = win
            .iter()
            .enumerate()
            .map(|(x, v)| x as f64 * v.unwrap())
            .sum();
        if denom.abs() < 1e-15 {
            continue;
        }
        out[t] = Some((w * sum_xy - sum_x * sum_y) / denom);
    }
    out
}

/// Slope over a raw `f64` series (e.g. Close prices).
pub fn slope_raw(values: &[f64], window: usize) -> Series {
    let opt: Series = values.iter().map(|v| Some(*v)).collect();
    slope(&opt, window)
}
