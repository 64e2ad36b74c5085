//! Portfolio: cash, open positions, closed trades, and snapshot history.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::{Position, PositionSide, StopType};
use crate::error::PortfolioError;

/// One completed round-trip (or partial-close) fill against the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub ticker: String,
    pub action: String,
    pub shares: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub return_pct: f64,
    pub holding_days: i64,
    pub reason: String,
    pub commission: f64,
}

/// A single day's portfolio state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub cash: f64,
    pub equity: f64,
    pub position_count: usize,
    /// ticker -> mark-to-market value at this snapshot.
    pub marks: HashMap<String, f64>,
}

/// Singleton aggregate per backtest run. The only mutable state in the
/// system; mutated exclusively by the orchestrator's per-day loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub initial_capital: f64,
    pub cash: f64,
    pub open_positions: HashMap<String, Position>,
    pub closed_positions: Vec<Position>,
    pub ledger: Vec<TradeRecord>,
    pub history: Vec<Snapshot>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            cash: initial_capital,
            open_positions: HashMap::new(),
            closed_positions: Vec::new(),
            ledger: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn has_position(&self, ticker: &str) -> bool {
        self.open_positions.contains_key(ticker)
    }

    pub fn get_position(&self, ticker: &str) -> Option<&Position> {
        self.open_positions.get(ticker)
    }

    /// Equity at a prices snapshot: cash + sum of mark-to-market position
    /// values. A ticker missing from `prices` falls back to the position's
    /// entry price (only relevant on the first day after entry).
    pub fn equity(&self, prices: &HashMap<String, f64>) -> f64 {
        let position_value: f64 = self
            .open_positions
            .values()
            .map(|p| {
                let price = prices.get(&p.ticker).copied().unwrap_or(p.entry_price);
                p.current_value(price)
            })
            .sum();
        self.cash + position_value
    }

    /// Open a new position or merge into an existing one (weighted-average
    /// cost). `cost` is `fill_price * shares + commission`, already computed
    /// by the execution simulator. Cash must cover it exactly; a caller that
    /// wants an approval check should verify cash sufficiency itself
    /// (`apply_risk_management` does this before an order ever reaches here).
    pub fn open_position(
        &mut self,
        ticker: &str,
        side: PositionSide,
        date: NaiveDate,
        fill_price: f64,
        shares: u64,
        units: u64,
        stop_price: f64,
        stop_type: StopType,
        strength_at_entry: f64,
        stage_at_entry: i32,
        cost: f64,
    ) -> Result<(), PortfolioError> {
        if cost > self.cash {
            return Err(PortfolioError::InsufficientCash {
                need: cost,
                have: self.cash,
            });
        }
        self.cash -= cost;

        match self.open_positions.get_mut(ticker) {
            Some(existing) => existing.add_fill(shares, fill_price, units),
            None => {
                let pos = Position::new(
                    ticker,
                    side,
                    date,
                    fill_price,
                    shares,
                    units,
                    stop_price,
                    stop_type,
                    strength_at_entry,
                    stage_at_entry,
                );
                self.open_positions.insert(ticker.to_string(), pos);
            }
        }
        Ok(())
    }

    /// Close `shares` of an open position (full or partial) at `exit_price`,
    /// crediting cash with proceeds net of `commission` and appending a
    /// ledger entry. On a full close the position moves to `closed_positions`
    /// exactly once.
    #[allow(clippy::too_many_arguments)]
    pub fn close_position(
        &mut self,
        ticker: &str,
        shares: u64,
        exit_price: f64,
        date: NaiveDate,
        commission: f64,
        proceeds: f64,
        reason: impl Into<String>,
    ) -> Result<TradeRecord, PortfolioError> {
        let position = self
            .open_positions
            .get_mut(ticker)
            .ok_or_else(|| PortfolioError::NoSuchPosition(ticker.to_string()))?;

        if shares > position.shares {
            return Err(PortfolioError::OverClose {
                requested: shares as f64,
                held: position.shares as f64,
            });
        }

        let entry_price = position.entry_price;
        let entry_date = position.entry_date;
        let side = position.side;
        let pnl = match side {
            PositionSide::Long => (exit_price - entry_price) * shares as f64 - commission,
            PositionSide::Short => (entry_price - exit_price) * shares as f64 - commission,
        };
        let return_pct = if entry_price > 0.0 {
            pnl / (entry_price * shares as f64)
        } else {
            0.0
        };
        let holding_days = (date - entry_date).num_days();

        self.cash += proceeds;

        let full_close = shares == position.shares;
        if full_close {
            let closed = self.open_positions.remove(ticker).unwrap();
            self.closed_positions.push(closed);
        } else {
            position.reduce(shares);
        }

        let action = match side {
            PositionSide::Long => "sell",
            PositionSide::Short => "cover",
        };

        let record = TradeRecord {
            date,
            ticker: ticker.to_string(),
            action: action.to_string(),
            shares,
            entry_price,
            exit_price,
            pnl,
            return_pct,
            holding_days,
            reason: reason.into(),
            commission,
        };
        self.ledger.push(record.clone());
        Ok(record)
    }

    /// Tickers whose stop has triggered at the given prices, with their
    /// stop price and type.
    pub fn check_stops(&self, prices: &HashMap<String, f64>) -> Vec<(String, f64, StopType)> {
        let mut triggered = Vec::new();
        for (ticker, pos) in &self.open_positions {
            if let Some(&price) = prices.get(ticker) {
                if pos.stop_triggered(price) {
                    triggered.push((ticker.clone(), pos.stop_price, pos.stop_type));
                }
            }
        }
        triggered
    }

    pub fn record_snapshot(&mut self, date: NaiveDate, prices: &HashMap<String, f64>) {
        let mut marks = HashMap::new();
        for (ticker, pos) in &self.open_positions {
            let price = prices.get(ticker).copied().unwrap_or(pos.entry_price);
            marks.insert(ticker.clone(), pos.current_value(price));
        }
        let equity = self.equity(prices);
        self.history.push(Snapshot {
            date,
            cash: self.cash,
            equity,
            position_count: self.open_positions.len(),
            marks,
        });
    }
}
