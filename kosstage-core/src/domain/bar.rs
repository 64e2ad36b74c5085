//! Raw OHLCV bar and bar-table validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single trading-day OHLCV row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// A bar is sane iff OHLC are non-negative, finite, and obey
    /// High >= Low, High >= Close, Low <= Close.
    pub fn is_sane(&self) -> bool {
        let values = [self.open, self.high, self.low, self.close];
        if values.iter().any(|v| v.is_nan() || *v < 0.0) {
            return false;
        }
        self.high >= self.low && self.high >= self.close && self.low <= self.close
    }
}

/// Remove duplicate dates (keeping the first occurrence) and sort ascending.
///
/// A bar table is only well-formed once this has been applied; the data
/// provider boundary is expected to hand over data already in this shape,
/// but the bulk loader re-validates defensively since providers are
/// external collaborators, not trusted internals.
pub fn normalize_bar_table(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}
