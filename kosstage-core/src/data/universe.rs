//! Universe enumeration: the KRX ticker list for KOSPI, KOSDAQ, or the
//! union. Raw vendor enumeration is an external collaborator, so this
//! module only specifies the interface (`UniverseProvider`) plus a
//! simple in-memory/TOML-backed implementation sufficient for tests and
//! small fixed universes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::Market;
use crate::error::DataError;

/// Produces the ticker list for a market tag. A real deployment supplies
/// its own KRX-backed implementation; `StaticUniverse` below is the
/// fixture-building one this crate ships.
pub trait UniverseProvider: Send + Sync {
    fn tickers(&self, market: Market) -> Vec<String>;
}

/// A fixed KOSPI/KOSDAQ ticker list, constructible in memory or parsed
/// from a TOML document of the form:
///
/// ```toml
/// kospi = ["005930", "000660"]
/// kosdaq = ["091990"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticUniverse {
    #[serde(default)]
    pub kospi: Vec<String>,
    #[serde(default)]
    pub kosdaq: Vec<String>,
}

impl StaticUniverse {
    pub fn new(kospi: Vec<String>, kosdaq: Vec<String>) -> Self {
        Self { kospi, kosdaq }
    }

    pub fn from_toml(content: &str) -> Result<Self, DataError> {
        toml::from_str(content).map_err(|e| DataError::UniverseParse(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path).map_err(|e| DataError::Io {
            ticker: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, DataError> {
        toml::to_string_pretty(self).map_err(|e| DataError::UniverseParse(e.to_string()))
    }
}

impl UniverseProvider for StaticUniverse {
    /// KOSPI and KOSDAQ lists as given; ALL is their concatenation with
    /// duplicates (a ticker dual-listed in both source lists, which
    /// should not happen in a well-formed universe but is not this
    /// crate's invariant to enforce) removed, KOSPI first.
    fn tickers(&self, market: Market) -> Vec<String> {
        match market {
            Market::Kospi => self.kospi.clone(),
            Market::Kosdaq => self.kosdaq.clone(),
            Market::All => {
                let mut all = self.kospi.clone();
                for ticker in &self.kosdaq {
                    if !all.contains(ticker) {
                        all.push(ticker.clone());
                    }
                }
                all
            }
        }
    }
}
