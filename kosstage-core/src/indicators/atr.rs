//! Average True Range.
//!
//! True Range on row *t* is `max(High_t - Low_t, |High_t - Close_{t-1}|, |Low_t - Close_{t-1}|)`,
//! undefined at t=0 (no previous close). ATR of period *n* is the EMA of True
//! Range with span *n* — not Wilder smoothing, a deliberate divergence from
//! the conventional formula. Undefined for the first *n* rows: one for the
//! True Range lag plus *n - 1* for the EMA warm-up.

use super::ema::ema_of_series;
use super::series::Series;
use crate::domain::Bar;

/// True Range series. `None` at index 0.
pub fn true_range(bars: &[Bar]) -> Series {
    let n = bars.len();
    let mut out: Series = vec![None; n];
    for i in 1..n {
        let high_low = bars[i].high - bars[i].low;
        let high_prev_close = (bars[i].high - bars[i - 1].close).abs();
        let low_prev_close = (bars[i].low - bars[i - 1].close).abs();
        out[i] = Some(high_low.max(high_prev_close).max(low_prev_close));
    }
    out
}

/// ATR of span `period` over the bar table.
pub fn atr(bars: &[Bar], period: usize) -> Series {
    let tr = true_range(bars);
    ema_of_series(&tr, period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, o: f64, h: f64, l: f64, c: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: o,
            high: h,
            low: l,
            close: c,
            volume: 1000,
        }
    }

    #[test]
    fn true_range_basic() {
        let bars = vec![
            bar(1, 100.0, 105.0, 95.0, 102.0),
            bar(2, 102.0, 108.0, 100.0, 106.0), // max(8, |108-102|=6, |100-102|=2) = 8
            bar(3, 106.0, 107.0, 98.0, 99.0),   // max(9, |107-106|=1, |98-106|=8) = 9
        ];
        let tr = true_range(&bars);
        assert_eq!(tr[0], None);
        assert!((tr[1].unwrap() - 8.0).abs() < 1e-9);
        assert!((tr[2].unwrap() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn atr_undefined_for_n_rows() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| bar((i + 1) as u32, c, c + 2.0, c - 2.0, c))
            .collect();
        let result = atr(&bars, 5);
        assert!(result[..5].iter().all(|v| v.is_none()));
        assert!(result[5..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn atr_strictly_positive_past_warmup() {
        let closes: Vec<f64> = vec![100.0, 103.0, 98.0, 105.0, 101.0, 107.0, 99.0, 110.0];
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| bar((i + 1) as u32, c, c + 3.0, c - 3.0, c))
            .collect();
        let result = atr(&bars, 3);
        for v in result.iter().skip(4).flatten() {
            assert!(*v > 0.0);
        }
    }
}
