//! MACD(fast, slow, signal): line, signal, and histogram.
//!
//! MACD line = EMA(fast) - EMA(slow). Signal line = EMA(signal) of the MACD
//! line. Histogram = MACD - Signal. Requires `fast < slow`. Undefined for
//! roughly `slow + signal - 1` rows.

use serde::{Deserialize, Serialize};

use super::ema::{ema, ema_of_series};
use super::series::{sub, Series};
use crate::error::IndicatorError;

/// One MACD configuration's three output columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Macd {
    pub line: Series,
    pub signal: Series,
    pub histogram: Series,
}

/// Compute MACD(fast, slow, signal) over raw Close prices.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Result<Macd, IndicatorError> {
    if fast >= slow {
        return Err(IndicatorError::InvalidMacdSpans { fast, slow });
    }
    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);
    let line = sub(&ema_fast, &ema_slow);
    let signal_line = ema_of_series(&line, signal);
    let histogram = sub(&line, &signal_line);
    Ok(Macd {
        line,
        signal: signal_line,
        histogram,
    })
}

/// The three MACD configurations this strategy tracks, all sharing signal
/// span 9: upper (5,20,9), middle (5,40,9), lower (20,40,9).
#[derive(Debug, Clone)]
pub struct TripleMacd {
    pub upper: Macd,
    pub middle: Macd,
    pub lower: Macd,
}

pub fn triple_macd(closes: &[f64]) -> Result<TripleMacd, IndicatorError> {
    Ok(TripleMacd {
        upper: macd(closes, 5, 20, 9)?,
        middle: macd(closes, 5, 40, 9)?,
        lower: macd(closes, 20, 40, 9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_rejects_fast_not_less_than_slow() {
        let closes = vec![1.0; 10];
        let err = macd(&closes, 20, 20, 9).unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidMacdSpans { .. }));
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1).collect();
        let m = macd(&closes, 5, 20, 9).unwrap();
        for i in 0..closes.len() {
            match (m.line[i], m.signal[i], m.histogram[i]) {
                (Some(l), Some(s), Some(h)) => assert!((h - (l - s)).abs() < 1e-9),
                (_, _, h) => assert!(h.is_none()),
            }
        }
    }

    #[test]
    fn triple_macd_produces_all_three() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let t = triple_macd(&closes).unwrap();
        assert!(t.upper.line.last().unwrap().is_some());
        assert!(t.middle.line.last().unwrap().is_some());
        assert!(t.lower.line.last().unwrap().is_some());
    }
}
