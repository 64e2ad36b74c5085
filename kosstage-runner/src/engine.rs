//! The backtest orchestrator: a single-threaded, sequential day loop over
//! a bulk-loaded, pre-annotated market dataset.
//!
//! Parallelism lives entirely in `kosstage_core::data::load_market_data`;
//! everything from here on reads one day at a time, in ticker order, so
//! that the ledger a run produces is exactly reproducible.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use kosstage_core::config::BacktestConfig;
use kosstage_core::data::{load_market_data, BarProvider, LoadProgress, TableCache};
use kosstage_core::domain::{Portfolio, PositionSide, StopType};
use kosstage_core::error::OrchestratorError;
use kosstage_core::execution::simulate_fill;
use kosstage_core::risk::{apply_risk_management, trailing_stop_update, RiskDecision, RiskSignal};
use kosstage_core::signals::{evaluate_signal_row, exit_signal_latest, SignalType};

use crate::error::RunError;

/// Whether the strategy is allowed to hold short positions. The stage
/// classifier and entry-signal synthesis both produce sell signals on
/// Stage 3/2 setups, but this desk only trades the long side: every
/// nominally-sell entry signal is coerced into a long buy before it
/// reaches the risk manager. Flip this once short borrow/margin handling
/// exists downstream.
pub const ALLOW_SHORT_ENTRIES: bool = false;

fn signal_type_label(signal_type: SignalType) -> &'static str {
    match signal_type {
        SignalType::Buy => "Buy",
        SignalType::Sell => "Sell",
    }
}

/// A completed backtest: the final portfolio plus the run's bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub portfolio: Portfolio,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub universe_size: usize,
    pub trading_days: usize,
}

/// Run a full backtest over `universe_tickers` between `start_date` and
/// `end_date` (inclusive), using `config` for sizing/risk/signal/data
/// parameters. Bulk-loads and annotates the market data first, then walks
/// the union of trading dates day by day: mark-to-market, trailing-stop
/// update, stop check, exit signals on still-open positions, an entry
/// scan over the universe in the order given, and a snapshot.
#[allow(clippy::too_many_arguments)]
pub fn run_backtest(
    config: &BacktestConfig,
    universe_tickers: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
    provider: &dyn BarProvider,
    cache: Option<&TableCache>,
    progress: Option<&dyn LoadProgress>,
) -> Result<RunOutcome, RunError> {
    if universe_tickers.is_empty() {
        return Err(OrchestratorError::EmptyUniverse.into());
    }
    if start_date > end_date {
        return Err(OrchestratorError::InvalidDateRange {
            start: start_date.to_string(),
            end: end_date.to_string(),
        }
        .into());
    }
    if config.initial_capital <= 0.0 {
        return Err(OrchestratorError::NonPositiveCapital(config.initial_capital).into());
    }

    let dataset = load_market_data(
        universe_tickers,
        start_date,
        end_date,
        config.data.lookback_pad_days,
        config.data.max_workers,
        provider,
        cache,
        progress,
    );

    let mut dates: Vec<NaiveDate> = dataset
        .values()
        .flat_map(|table| table.bars.iter().map(|b| b.date).filter(|d| *d >= start_date && *d <= end_date))
        .collect();
    dates.sort();
    dates.dedup();
    if dates.is_empty() {
        return Err(RunError::NoTradingDates);
    }

    let mut portfolio = Portfolio::new(config.initial_capital);

    for &date in &dates {
        let mut prices: HashMap<String, f64> = HashMap::new();
        let mut slices = HashMap::new();
        for (ticker, table) in &dataset {
            let sliced = table.slice_up_to(date);
            let Some(last) = sliced.bars.last() else { continue };
            if last.date != date {
                continue;
            }
            prices.insert(ticker.clone(), last.close);
            slices.insert(ticker.clone(), sliced);
        }

        for (ticker, position) in portfolio.open_positions.iter_mut() {
            let (Some(&price), Some(slice)) = (prices.get(ticker), slices.get(ticker)) else {
                continue;
            };
            position.update_extreme(price);
            if let Some(atr) = slice.atr.last().copied().flatten() {
                let candidate =
                    trailing_stop_update(position.side, position.stop_price, position.extreme_price, atr, config.risk.atr_multiplier, position.entry_price);
                position.ratchet_stop(candidate);
            }
        }

        for (ticker, stop_price, stop_type) in portfolio.check_stops(&prices) {
            let (shares, side) = portfolio.get_position(&ticker).map(|p| (p.shares, p.side)).unwrap();
            let action = match side {
                PositionSide::Long => SignalType::Sell,
                PositionSide::Short => SignalType::Buy,
            };
            let fill = simulate_fill(ticker.clone(), action, date, stop_price, shares, config.commission_rate, config.slippage_pct)
                .map_err(RunError::from)?;
            let proceeds = -fill.total_cost;
            let reason = format!(
                "stop_loss ({})",
                match stop_type {
                    StopType::Volatility => "volatility",
                    StopType::Trend => "trend",
                }
            );
            portfolio
                .close_position(&ticker, shares, fill.fill_price, date, fill.commission, proceeds, reason)
                .map_err(RunError::from)?;
        }

        let held: Vec<String> = portfolio.open_positions.keys().cloned().collect();
        for ticker in held {
            let Some(slice) = slices.get(&ticker) else { continue };
            let Some(position) = portfolio.get_position(&ticker) else { continue };
            let side = position.side;
            let held_shares = position.shares;
            let exit = exit_signal_latest(slice, side);
            if !exit.should_exit {
                continue;
            }
            let shares_to_close = if exit.close_pct >= 100.0 {
                held_shares
            } else {
                let partial = ((held_shares as f64) * (exit.close_pct / 100.0)).floor() as u64;
                partial.max(1).min(held_shares)
            };
            let close_price = *prices.get(&ticker).unwrap();
            let action = match side {
                PositionSide::Long => SignalType::Sell,
                PositionSide::Short => SignalType::Buy,
            };
            let fill = simulate_fill(ticker.clone(), action, date, close_price, shares_to_close, config.commission_rate, config.slippage_pct)
                .map_err(RunError::from)?;
            let proceeds = -fill.total_cost;
            portfolio
                .close_position(&ticker, shares_to_close, fill.fill_price, date, fill.commission, proceeds, exit.reason.clone())
                .map_err(RunError::from)?;
        }

        for ticker in universe_tickers {
            if portfolio.has_position(ticker) {
                continue;
            }
            let Some(slice) = slices.get(ticker) else { continue };
            let t = slice.len() - 1;
            let row = evaluate_signal_row(slice, t, config.signal.enable_early_signals, &config.signal.filters);
            if row.entry.value == 0 || !row.filters.filter_passed {
                continue;
            }
            if row.strength < config.signal.min_strength_threshold {
                continue;
            }
            let (Some(atr), Some(ema_20)) = (slice.atr[t], slice.ema_20[t]) else { continue };

            let original_signal_type = row.entry.signal_type.unwrap();
            let coerced_signal_type = if original_signal_type == SignalType::Sell && !ALLOW_SHORT_ENTRIES {
                tracing::debug!(ticker, "coercing sell entry signal into a long buy: short entries disabled");
                SignalType::Buy
            } else {
                original_signal_type
            };

            let current_price = *prices.get(ticker).unwrap();
            let account_equity = portfolio.equity(&prices);
            let risk_signal = RiskSignal {
                ticker: ticker.clone(),
                action: coerced_signal_type,
                signal_strength: row.strength,
                current_price,
            };
            let decision = apply_risk_management(&risk_signal, account_equity, atr, ema_20, config.commission_rate, config.slippage_pct, &config.risk);
            let RiskDecision::Approved(order) = decision else { continue };

            let fill = simulate_fill(ticker.clone(), SignalType::Buy, date, current_price, order.shares, config.commission_rate, config.slippage_pct)
                .map_err(RunError::from)?;
            let stage = slice.stage[t].unwrap_or(0);
            tracing::info!(
                ticker,
                shares = order.shares,
                reason = %format!("{} (Stage {stage})", signal_type_label(original_signal_type)),
                "opened position"
            );
            portfolio
                .open_position(
                    ticker,
                    order.side,
                    date,
                    fill.fill_price,
                    order.shares,
                    order.units,
                    order.stop_price,
                    order.stop_type,
                    row.strength,
                    stage,
                    fill.total_cost,
                )
                .map_err(RunError::from)?;
        }

        portfolio.record_snapshot(date, &prices);
    }

    Ok(RunOutcome {
        portfolio,
        start_date,
        end_date,
        universe_size: universe_tickers.len(),
        trading_days: dates.len(),
    })
}
