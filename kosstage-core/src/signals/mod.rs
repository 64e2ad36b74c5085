//! The signal engine: entry/exit signal synthesis, 0-100 strength
//! scoring, and four-filter admission, all built on an already-staged
//! (`indicators` + `stage`) `EnrichedTable`.

pub mod entry;
pub mod exit;
pub mod filter;
pub mod strength;

use serde::{Deserialize, Serialize};

pub use entry::{entry_signal_at, generate_entry_signals, EntrySignal};
pub use exit::{exit_signal_at, exit_signal_latest, ExitSignal};
pub use filter::{evaluate_filters, FilterConfig, FilterResult};
pub use strength::{signal_strength_at, signal_strength_series};

use crate::indicators::EnrichedTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalType {
    Buy,
    Sell,
}

/// One row's worth of signal-engine output, the unit the orchestrator
/// actually consumes when scanning the universe for entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub entry: EntrySignal,
    pub strength: f64,
    pub filters: FilterResult,
}

/// Entry signal, strength score, and filter admission for row `t`, the
/// single call site the entry scan needs per ticker per day.
pub fn evaluate_signal_row(table: &EnrichedTable, t: usize, enable_early: bool, filter_config: &FilterConfig) -> SignalRow {
    let entry = entry_signal_at(table, t, enable_early);
    let strength = signal_strength_at(table, t);
    let filters = evaluate_filters(table, t, &entry, filter_config);
    SignalRow { entry, strength, filters }
}
