//! On-disk cache for per-ticker enriched tables, keyed by
//! `(ticker, start_date, end_date)`. Writes are atomic: a temp file is
//! written and renamed into place, so a concurrent reader — another
//! worker in the bulk loader's thread pool — never observes a
//! half-written file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::indicators::EnrichedTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSummary {
    pub enabled: bool,
    pub directory: String,
    pub file_count: usize,
    pub total_size_mb: f64,
}

/// A directory of `{ticker}_{start}_{end}.json` files, one per cached
/// enriched table.
pub struct TableCache {
    cache_dir: PathBuf,
    enabled: bool,
}

impl TableCache {
    pub fn new(cache_dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            enabled,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn path_for(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> PathBuf {
        self.cache_dir.join(format!("{ticker}_{start}_{end}.json"))
    }

    /// Deserialize a cached table on a hit. A missing file, or a file
    /// that fails to parse, is a miss — corrupt cache entries are never
    /// treated as a hard error, just logged and bypassed.
    pub fn load(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Option<EnrichedTable> {
        if !self.enabled {
            return None;
        }
        let path = self.path_for(ticker, start, end);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return None,
        };
        match serde_json::from_str(&content) {
            Ok(table) => Some(table),
            Err(e) => {
                tracing::debug!(ticker, error = %e, "cache entry failed to deserialize, treating as a miss");
                None
            }
        }
    }

    /// Write-through a freshly computed table. A no-op when the cache is
    /// disabled.
    pub fn store(&self, ticker: &str, start: NaiveDate, end: NaiveDate, table: &EnrichedTable) -> Result<(), DataError> {
        if !self.enabled {
            return Ok(());
        }
        fs::create_dir_all(&self.cache_dir).map_err(|e| DataError::Io {
            ticker: ticker.to_string(),
            source: e,
        })?;

        let path = self.path_for(ticker, start, end);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string(table)?;
        fs::write(&tmp_path, json).map_err(|e| DataError::Io {
            ticker: ticker.to_string(),
            source: e,
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::Io {
                ticker: ticker.to_string(),
                source: e,
            }
        })?;
        Ok(())
    }

    /// Remove the entire cache directory. Missing directory is not an
    /// error.
    pub fn clear_cache(&self) -> Result<(), DataError> {
        if !self.cache_dir.exists() {
            return Ok(());
        }
        fs::remove_dir_all(&self.cache_dir).map_err(|e| DataError::Io {
            ticker: "*".to_string(),
            source: e,
        })
    }

    pub fn summary(&self) -> CacheSummary {
        let mut file_count = 0usize;
        let mut total_bytes = 0u64;
        if let Ok(entries) = fs::read_dir(&self.cache_dir) {
            for entry in entries.flatten() {
                if let Ok(meta) = entry.metadata() {
                    if meta.is_file() {
                        file_count += 1;
                        total_bytes += meta.len();
                    }
                }
            }
        }
        CacheSummary {
            enabled: self.enabled,
            directory: self.cache_dir.display().to_string(),
            file_count,
            total_size_mb: total_bytes as f64 / (1024.0 * 1024.0),
        }
    }
}
