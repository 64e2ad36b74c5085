//! The indicator pipeline: EMA/ATR/triple-MACD/peakout/slope/direction over
//! a time-indexed OHLCV table, materialized into an `EnrichedTable`.
//!
//! Stage and stage-transition columns are *not* filled by this module —
//! they are the stage classifier's job (`crate::stage`) and are annotated
//! onto the same `EnrichedTable` in a second pass, mirroring how the data
//! manager actually wires the two stages together.

pub mod atr;
pub mod direction;
pub mod ema;
pub mod macd;
pub mod peakout;
pub mod series;
pub mod slope;
pub mod sma;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use direction::{Direction, DirectionAgreement};
use macd::{Macd, TripleMacd};
use peakout::PeakoutSeries;
use series::Series;

/// Peakout lookback used throughout the composed pipeline.
pub const PEAKOUT_LOOKBACK: usize = 1;

/// Minimum bar-table length for every enriched column to be defined on the
/// final row (49 = the slow MACD's warm-up).
pub const MIN_USABLE_LENGTH: usize = 49;

/// The bar table augmented with every computed column the strategy needs.
/// Early rows carry `None` until enough history exists; downstream code
/// must never index past what it has checked is defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTable {
    pub bars: Vec<Bar>,

    pub ema_5: Series,
    pub ema_20: Series,
    pub ema_40: Series,
    pub atr: Series,

    pub macd_upper: Macd,
    pub macd_middle: Macd,
    pub macd_lower: Macd,

    pub peakout_hist_upper: PeakoutSeries,
    pub peakout_hist_middle: PeakoutSeries,
    pub peakout_hist_lower: PeakoutSeries,
    pub peakout_line_upper: PeakoutSeries,
    pub peakout_line_middle: PeakoutSeries,
    pub peakout_line_lower: PeakoutSeries,

    pub slope_macd_upper: Series,
    pub slope_macd_middle: Series,
    pub slope_macd_lower: Series,

    pub direction_upper: Vec<Direction>,
    pub direction_middle: Vec<Direction>,
    pub direction_lower: Vec<Direction>,
    pub direction_agreement: Vec<DirectionAgreement>,

    /// Filled by `crate::stage::determine_stage`. `None` until then.
    pub stage: Vec<Option<i32>>,
    /// Filled by `crate::stage::detect_stage_transition`. `None` until then.
    pub stage_transition: Vec<Option<i32>>,
    /// Filled by `crate::stage::ma_spread`.
    pub spread_5_20: Series,
    pub spread_20_40: Series,
    pub spread_5_40: Series,
    /// Filled by `crate::stage::ma_slope` (default window 5).
    pub slope_ema_5: Series,
    pub slope_ema_20: Series,
    pub slope_ema_40: Series,
}

impl EnrichedTable {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Slice to rows whose date is `<= cutoff`, the single look-ahead
    /// boundary every day-loop decision passes through.
    pub fn slice_up_to(&self, cutoff: chrono::NaiveDate) -> EnrichedTable {
        let idx = self.bars.partition_point(|b| b.date <= cutoff);
        self.slice_first(idx)
    }

    fn slice_first(&self, n: usize) -> EnrichedTable {
        EnrichedTable {
            bars: self.bars[..n].to_vec(),
            ema_5: self.ema_5[..n].to_vec(),
            ema_20: self.ema_20[..n].to_vec(),
            ema_40: self.ema_40[..n].to_vec(),
            atr: self.atr[..n].to_vec(),
            macd_upper: Macd {
                line: self.macd_upper.line[..n].to_vec(),
                signal: self.macd_upper.signal[..n].to_vec(),
                histogram: self.macd_upper.histogram[..n].to_vec(),
            },
            macd_middle: Macd {
                line: self.macd_middle.line[..n].to_vec(),
                signal: self.macd_middle.signal[..n].to_vec(),
                histogram: self.macd_middle.histogram[..n].to_vec(),
            },
            macd_lower: Macd {
                line: self.macd_lower.line[..n].to_vec(),
                signal: self.macd_lower.signal[..n].to_vec(),
                histogram: self.macd_lower.histogram[..n].to_vec(),
            },
            peakout_hist_upper: self.peakout_hist_upper[..n].to_vec(),
            peakout_hist_middle: self.peakout_hist_middle[..n].to_vec(),
            peakout_hist_lower: self.peakout_hist_lower[..n].to_vec(),
            peakout_line_upper: self.peakout_line_upper[..n].to_vec(),
            peakout_line_middle: self.peakout_line_middle[..n].to_vec(),
            peakout_line_lower: self.peakout_line_lower[..n].to_vec(),
            slope_macd_upper: self.slope_macd_upper[..n].to_vec(),
            slope_macd_middle: self.slope_macd_middle[..n].to_vec(),
            slope_macd_lower: self.slope_macd_lower[..n].to_vec(),
            direction_upper: self.direction_upper[..n].to_vec(),
            direction_middle: self.direction_middle[..n].to_vec(),
            direction_lower: self.direction_lower[..n].to_vec(),
            direction_agreement: self.direction_agreement[..n].to_vec(),
            stage: self.stage[..n].to_vec(),
            stage_transition: self.stage_transition[..n].to_vec(),
            spread_5_20: self.spread_5_20[..n].to_vec(),
            spread_20_40: self.spread_20_40[..n].to_vec(),
            spread_5_40: self.spread_5_40[..n].to_vec(),
            slope_ema_5: self.slope_ema_5[..n].to_vec(),
            slope_ema_20: self.slope_ema_20[..n].to_vec(),
            slope_ema_40: self.slope_ema_40[..n].to_vec(),
        }
    }
}

/// `calculate_all_indicators` — the composition: EMA -> ATR -> triple MACD
/// -> peakouts on all six MACD/histogram series -> slopes on the three
/// MACD lines -> directions on the three MACD lines -> Direction_Agreement.
///
/// The input is never mutated; an empty table maps to an empty table, no
/// error. Stage and stage-transition columns start out all-`None` — they
/// are filled by a subsequent call into `crate::stage`.
pub fn calculate_all_indicators(bars: Vec<Bar>) -> EnrichedTable {
    let n = bars.len();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let ema_5 = ema::ema(&closes, 5);
    let ema_20 = ema::ema(&closes, 20);
    let ema_40 = ema::ema(&closes, 40);
    let atr_series = atr::atr(&bars, 20);

    let triple = if n == 0 {
        TripleMacd {
            upper: Macd {
                line: vec![],
                signal: vec![],
                histogram: vec![],
            },
            middle: Macd {
                line: vec![],
                signal: vec![],
                histogram: vec![],
            },
            lower: Macd {
                line: vec![],
                signal: vec![],
                histogram: vec![],
            },
        }
    } else {
        macd::triple_macd(&closes).expect("triple MACD spans (5,20)/(5,40)/(20,40) are always valid")
    };

    let peakout_hist_upper = peakout::peakout(&triple.upper.histogram, PEAKOUT_LOOKBACK);
    let peakout_hist_middle = peakout::peakout(&triple.middle.histogram, PEAKOUT_LOOKBACK);
    let peakout_hist_lower = peakout::peakout(&triple.lower.histogram, PEAKOUT_LOOKBACK);
    let peakout_line_upper = peakout::peakout(&triple.upper.line, PEAKOUT_LOOKBACK);
    let peakout_line_middle = peakout::peakout(&triple.middle.line, PEAKOUT_LOOKBACK);
    let peakout_line_lower = peakout::peakout(&triple.lower.line, PEAKOUT_LOOKBACK);

    let slope_macd_upper = slope::slope(&triple.upper.line, 5);
    let slope_macd_middle = slope::slope(&triple.middle.line, 5);
    let slope_macd_lower = slope::slope(&triple.lower.line, 5);

    let direction_upper = direction::directions(&triple.upper.line, 0.0);
    let direction_middle = direction::directions(&triple.middle.line, 0.0);
    let direction_lower = direction::directions(&triple.lower.line, 0.0);

    let direction_agreement: Vec<DirectionAgreement> = (0..n)
        .map(|i| direction::agreement(direction_upper[i], direction_middle[i], direction_lower[i]))
        .collect();

    EnrichedTable {
        bars,
        ema_5,
        ema_20,
        ema_40,
        atr: atr_series,
        macd_upper: triple.upper,
        macd_middle: triple.middle,
        macd_lower: triple.lower,
        peakout_hist_upper,
        peakout_hist_middle,
        peakout_hist_lower,
        peakout_line_upper,
        peakout_line_middle,
        peakout_line_lower,
        slope_macd_upper,
        slope_macd_middle,
        slope_macd_lower,
        direction_upper,
        direction_middle,
        direction_lower,
        direction_agreement,
        stage: vec![None; n],
        stage_transition: vec![None; n],
        spread_5_20: vec![None; n],
        spread_20_40: vec![None; n],
        spread_5_40: vec![None; n],
        slope_ema_5: vec![None; n],
        slope_ema_20: vec![None; n],
        slope_ema_40: vec![None; n],
    }
}
