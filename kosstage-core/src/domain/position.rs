//! An open position: identity, weighted-average cost, stop, and provenance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopType {
    Volatility,
    Trend,
}

/// An open position, owned exclusively by `Portfolio`. Positions never
/// reference each other or the Portfolio back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub side: PositionSide,
    pub entry_date: NaiveDate,
    /// Weighted-average entry price across all fills into this position.
    pub entry_price: f64,
    pub shares: u64,
    pub units: u64,
    pub stop_price: f64,
    pub stop_type: StopType,
    /// Highest price seen since entry (long) / lowest price seen (short).
    /// Drives the trailing stop.
    pub extreme_price: f64,
    pub strength_at_entry: f64,
    pub stage_at_entry: i32,
}

impl Position {
    pub fn new(
        ticker: impl Into<String>,
        side: PositionSide,
        entry_date: NaiveDate,
        entry_price: f64,
        shares: u64,
        units: u64,
        stop_price: f64,
        stop_type: StopType,
        strength_at_entry: f64,
        stage_at_entry: i32,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            side,
            entry_date,
            entry_price,
            shares,
            units,
            stop_price,
            stop_type,
            extreme_price: entry_price,
            strength_at_entry,
            stage_at_entry,
        }
    }

    /// Current mark-to-market value of the position at `price`.
    pub fn current_value(&self, price: f64) -> f64 {
        price * self.shares as f64
    }

    /// Unrealized P&L at `price`, long and short aware.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        let diff = match self.side {
            PositionSide::Long => price - self.entry_price,
            PositionSide::Short => self.entry_price - price,
        };
        diff * self.shares as f64
    }

    /// Merge an additional fill into this position: share-weighted entry
    /// price, summed shares and units. Stop/side/provenance are untouched —
    /// the backtest path never re-enters an already-held ticker, so this
    /// branch is quiescent in practice, but the invariant must still hold.
    pub fn add_fill(&mut self, shares: u64, price: f64, units: u64) {
        let old_cost = self.entry_price * self.shares as f64;
        let new_cost = price * shares as f64;
        let total_shares = self.shares + shares;
        self.entry_price = (old_cost + new_cost) / total_shares as f64;
        self.shares = total_shares;
        self.units += units;
    }

    /// Update the running extreme from the day's price.
    pub fn update_extreme(&mut self, price: f64) {
        match self.side {
            PositionSide::Long => {
                if price > self.extreme_price {
                    self.extreme_price = price;
                }
            }
            PositionSide::Short => {
                if price < self.extreme_price {
                    self.extreme_price = price;
                }
            }
        }
    }

    /// Ratchet the stop to `candidate` — the single enforcement point for
    /// the monotonicity invariant. A long's stop never decreases; a
    /// short's stop never increases.
    pub fn ratchet_stop(&mut self, candidate: f64) {
        let tighter = match self.side {
            PositionSide::Long => candidate > self.stop_price,
            PositionSide::Short => candidate < self.stop_price,
        };
        if tighter {
            self.stop_price = candidate;
        }
    }

    /// Whether the stop has triggered at `price`.
    pub fn stop_triggered(&self, price: f64) -> bool {
        match self.side {
            PositionSide::Long => price <= self.stop_price,
            PositionSide::Short => price >= self.stop_price,
        }
    }

    /// Reduce the position by `shares` (a partial close), preserving the
    /// entry price exactly and scaling units proportionally.
    pub fn reduce(&mut self, shares: u64) {
        debug_assert!(shares <= self.shares);
        let frac = shares as f64 / self.shares as f64;
        self.shares -= shares;
        let reduced_units = (self.units as f64 * frac).round() as u64;
        self.units = self.units.saturating_sub(reduced_units).max(1);
    }
}
