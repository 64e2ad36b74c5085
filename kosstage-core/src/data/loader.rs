//! Bulk historical load: bounded-worker-pool parallel fetch, per-ticker
//! indicator/stage wiring, and cache write-through.
//!
//! Parallelism exists in exactly one place in this crate — here. The
//! orchestrator's day loop is itself single-threaded and sequential;
//! this module is the one fan-out, and its workers never share mutable
//! state with each other or with the caller beyond the result map each
//! assembles independently.

use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;

use super::cache::TableCache;
use crate::domain::bar::normalize_bar_table;
use crate::domain::Bar;
use crate::error::DataError;
use crate::indicators::{calculate_all_indicators, EnrichedTable, MIN_USABLE_LENGTH};
use crate::stage::annotate;

/// The external market-data collaborator: a normalized bar table for
/// `(ticker, start_date, end_date)`. Implementations are expected to
/// return dates ascending and unique, but the loader re-validates
/// defensively since a provider is an external boundary, not a trusted
/// internal.
pub trait BarProvider: Send + Sync {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError>;
}

/// Reports progress through a bulk load without this crate depending on
/// a UI library.
pub trait LoadProgress: Send + Sync {
    fn on_ticker_complete(&self, ticker: &str, completed: usize, total: usize, success: bool);
}

/// The per-ticker result of `calculate_all_indicators` + `stage::annotate`,
/// keyed by ticker.
pub type MarketDataset = HashMap<String, EnrichedTable>;

fn load_one_ticker(
    ticker: &str,
    padded_start: NaiveDate,
    start_date: NaiveDate,
    end_date: NaiveDate,
    provider: &dyn BarProvider,
    cache: Option<&TableCache>,
) -> Option<EnrichedTable> {
    if let Some(cache) = cache {
        if let Some(table) = cache.load(ticker, padded_start, end_date) {
            return Some(table);
        }
    }

    let bars = match provider.fetch(ticker, padded_start, end_date) {
        Ok(bars) => bars,
        Err(e) => {
            tracing::warn!(ticker, error = %e, "dropping ticker: fetch failed");
            return None;
        }
    };

    let bars = normalize_bar_table(bars);
    if let Some(bad) = bars.iter().find(|b| !b.is_sane()) {
        tracing::warn!(ticker, date = %bad.date, "dropping ticker: insane bar in fetched table");
        return None;
    }
    if bars.is_empty() {
        tracing::warn!(ticker, "dropping ticker: empty bar table");
        return None;
    }

    let warmup_rows = bars.iter().filter(|b| b.date < start_date).count();
    if warmup_rows < MIN_USABLE_LENGTH {
        tracing::warn!(
            ticker,
            warmup_rows,
            needed = MIN_USABLE_LENGTH,
            "fewer warm-up rows than the slow MACD needs before start_date; widen data.lookback_pad_days if this recurs"
        );
    }

    let mut table = calculate_all_indicators(bars);
    annotate(&mut table);

    if let Some(cache) = cache {
        if let Err(e) = cache.store(ticker, padded_start, end_date, &table) {
            tracing::warn!(ticker, error = %e, "cache write-through failed, continuing without it");
        }
    }

    Some(table)
}

/// Load and annotate every ticker in `tickers` over `[start_date, end_date]`,
/// fetching `[start_date - lookback_pad_days, end_date]` so indicators are
/// warmed up by `start_date`. Runs with a bounded `rayon` thread pool of
/// `max_workers` threads; a per-ticker failure is logged and the ticker
/// dropped from the result, never aborting the whole load.
#[allow(clippy::too_many_arguments)]
pub fn load_market_data(
    tickers: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
    lookback_pad_days: i64,
    max_workers: usize,
    provider: &dyn BarProvider,
    cache: Option<&TableCache>,
    progress: Option<&dyn LoadProgress>,
) -> MarketDataset {
    if tickers.is_empty() {
        return MarketDataset::new();
    }

    let padded_start = start_date - chrono::Duration::days(lookback_pad_days);
    let total = tickers.len();

    let run = || -> Vec<(String, Option<EnrichedTable>)> {
        tickers
            .par_iter()
            .enumerate()
            .map(|(i, ticker)| {
                let result = load_one_ticker(ticker, padded_start, start_date, end_date, provider, cache);
                if let Some(progress) = progress {
                    progress.on_ticker_complete(ticker, i + 1, total, result.is_some());
                }
                (ticker.clone(), result)
            })
            .collect()
    };

    let results = match rayon::ThreadPoolBuilder::new().num_threads(max_workers.max(1)).build() {
        Ok(pool) => pool.install(run),
        Err(e) => {
            tracing::warn!(error = %e, "failed to build a bounded thread pool, falling back to the global one");
            run()
        }
    };

    results.into_iter().filter_map(|(ticker, table)| table.map(|t| (ticker, t))).collect()
}
