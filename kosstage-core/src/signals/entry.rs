//! Entry signal synthesis: Stage + MACD-direction agreement into a
//! trinary-escalated `Entry_Signal` column.

use serde::{Deserialize, Serialize};

use super::SignalType;
use crate::indicators::direction::Direction;
use crate::indicators::EnrichedTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySignal {
    /// -2 early sell, -1 normal sell, 0 none, +1 normal buy, +2 early buy.
    pub value: i32,
    pub signal_type: Option<SignalType>,
    pub reason: Option<String>,
}

impl EntrySignal {
    fn none() -> Self {
        Self {
            value: 0,
            signal_type: None,
            reason: None,
        }
    }
}

fn all_up(dirs: [Direction; 3]) -> bool {
    dirs.iter().all(|d| *d == Direction::Up)
}

fn all_down(dirs: [Direction; 3]) -> bool {
    dirs.iter().all(|d| *d == Direction::Down)
}

/// Entry signal for a single row. Normal conditions take priority over
/// early ones; early conditions are skipped entirely when `enable_early`
/// is false.
pub fn entry_signal_at(table: &EnrichedTable, t: usize, enable_early: bool) -> EntrySignal {
    let stage = table.stage[t];
    let dirs = [table.direction_upper[t], table.direction_middle[t], table.direction_lower[t]];

    if stage == Some(6) && all_up(dirs) {
        return EntrySignal {
            value: 1,
            signal_type: Some(SignalType::Buy),
            reason: Some("Stage 6 with all MACD lines up (normal buy)".to_string()),
        };
    }
    if stage == Some(3) && all_down(dirs) {
        return EntrySignal {
            value: -1,
            signal_type: Some(SignalType::Sell),
            reason: Some("Stage 3 with all MACD lines down (normal sell)".to_string()),
        };
    }
    if enable_early {
        if stage == Some(5) && all_up(dirs) {
            return EntrySignal {
                value: 2,
                signal_type: Some(SignalType::Buy),
                reason: Some("Stage 5 with all MACD lines up (early buy)".to_string()),
            };
        }
        if stage == Some(2) && all_down(dirs) {
            return EntrySignal {
                value: -2,
                signal_type: Some(SignalType::Sell),
                reason: Some("Stage 2 with all MACD lines down (early sell)".to_string()),
            };
        }
    }
    EntrySignal::none()
}

/// Entry signal for every row.
pub fn generate_entry_signals(table: &EnrichedTable, enable_early: bool) -> Vec<EntrySignal> {
    (0..table.len()).map(|t| entry_signal_at(table, t, enable_early)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::calculate_all_indicators;
    use crate::stage::annotate;
    use chrono::NaiveDate;

    fn table(closes: &[f64]) -> EnrichedTable {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| crate::domain::Bar {
                date: base + chrono::Duration::days(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 1000,
            })
            .collect();
        let mut t = calculate_all_indicators(bars);
        annotate(&mut t);
        t
    }

    #[test]
    fn empty_table_yields_empty_signals() {
        let t = table(&[]);
        let signals = generate_entry_signals(&t, false);
        assert!(signals.is_empty());
    }

    #[test]
    fn early_signals_disabled_by_default_configuration() {
        // A row that only satisfies the early-buy (Stage 5) condition must
        // yield no signal when early signals are off.
        let closes: Vec<f64> = (0..90).map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.3).collect();
        let t = table(&closes);
        for i in 0..t.len() {
            if t.stage[i] == Some(5) {
                let sig = entry_signal_at(&t, i, false);
                assert_eq!(sig.value, 0);
            }
        }
    }

    #[test]
    fn signal_strength_series_matches_table_length() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let t = table(&closes);
        let signals = generate_entry_signals(&t, true);
        assert_eq!(signals.len(), t.len());
    }
}
