//! Integration-style scenarios exercising the full day-loop orchestrator
//! end to end: data loading, indicator/stage annotation, signal scan,
//! risk management, execution, portfolio bookkeeping, analytics, and
//! CSV export wired together exactly as a real run would use them.

use chrono::NaiveDate;

use kosstage_core::config::BacktestConfig;
use kosstage_core::data::BarProvider;
use kosstage_core::domain::{Bar, PositionSide};
use kosstage_core::error::DataError;

use kosstage_runner::analytics::analyze;
use kosstage_runner::engine::run_backtest;
use kosstage_runner::export::trades_csv;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// A deterministic synthetic market: a clean uptrend with a small periodic
/// wiggle, distinct per ticker so the universe isn't degenerate.
struct SyntheticMarket;

impl BarProvider for SyntheticMarket {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError> {
        let n = (end - start).num_days() + 1;
        let offset = ticker.bytes().map(|b| b as i64).sum::<i64>() % 7;
        Ok((0..n)
            .map(|i| {
                let x = i + offset;
                let close = 50_000.0 + x as f64 * 120.0 + (x as f64 * 0.3).sin() * 600.0;
                Bar {
                    date: start + chrono::Duration::days(i),
                    open: close,
                    high: close + 80.0,
                    low: close - 80.0,
                    close,
                    volume: 500_000,
                }
            })
            .collect())
    }
}

fn universe() -> Vec<String> {
    vec!["005930".to_string(), "000660".to_string(), "035420".to_string()]
}

#[test]
fn same_inputs_produce_an_identical_run() {
    let config = BacktestConfig::default();
    let tickers = universe();

    let first = run_backtest(&config, &tickers, d(2024, 1, 1), d(2024, 9, 1), &SyntheticMarket, None, None).unwrap();
    let second = run_backtest(&config, &tickers, d(2024, 1, 1), d(2024, 9, 1), &SyntheticMarket, None, None).unwrap();

    assert_eq!(first.trading_days, second.trading_days);
    assert_eq!(first.portfolio.ledger.len(), second.portfolio.ledger.len());
    assert_eq!(first.portfolio.history.len(), second.portfolio.history.len());
    assert_eq!(first.portfolio.cash, second.portfolio.cash);

    for (a, b) in first.portfolio.history.iter().zip(second.portfolio.history.iter()) {
        assert_eq!(a.date, b.date);
        assert_eq!(a.equity, b.equity);
    }
    for (a, b) in first.portfolio.ledger.iter().zip(second.portfolio.ledger.iter()) {
        assert_eq!(a.ticker, b.ticker);
        assert_eq!(a.pnl, b.pnl);
        assert_eq!(a.date, b.date);
    }
}

#[test]
fn a_full_run_never_opens_a_short_position() {
    let config = BacktestConfig::default();
    let tickers = universe();
    let outcome = run_backtest(&config, &tickers, d(2024, 1, 1), d(2024, 9, 1), &SyntheticMarket, None, None).unwrap();

    for position in outcome.portfolio.open_positions.values().chain(outcome.portfolio.closed_positions.iter()) {
        assert_eq!(position.side, PositionSide::Long);
    }
}

#[test]
fn analytics_and_export_are_consistent_with_a_real_run() {
    let config = BacktestConfig::default();
    let tickers = universe();
    let outcome = run_backtest(&config, &tickers, d(2024, 1, 1), d(2024, 9, 1), &SyntheticMarket, None, None).unwrap();

    let final_equity = outcome.portfolio.history.last().map(|s| s.equity).unwrap_or(outcome.portfolio.initial_capital);
    let report = analyze(&outcome.portfolio.history, &outcome.portfolio.ledger, outcome.portfolio.initial_capital, 0.0);

    assert_eq!(report.initial_capital, outcome.portfolio.initial_capital);
    assert!((report.final_equity - final_equity).abs() < 1e-6);
    assert_eq!(report.trades.trade_count, outcome.portfolio.ledger.len());

    let csv = trades_csv(&outcome.portfolio.ledger).unwrap();
    let body = &csv.as_bytes()[3..]; // skip UTF-8 BOM
    let text = std::str::from_utf8(body).unwrap();
    // header + one row per ledger entry
    assert_eq!(text.lines().count(), outcome.portfolio.ledger.len() + 1);
}

#[test]
fn an_empty_universe_is_rejected_before_any_data_load() {
    let config = BacktestConfig::default();
    let err = run_backtest(&config, &[], d(2024, 1, 1), d(2024, 6, 1), &SyntheticMarket, None, None).unwrap_err();
    assert!(matches!(err, kosstage_runner::error::RunError::Orchestrator(_)));
}
