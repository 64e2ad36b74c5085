//! Typed error enums for every subsystem boundary.
//!
//! Per-ticker failures during bulk load or a day's decision scan are never
//! represented as these errors reaching the orchestrator — they are logged
//! and demoted to a dropped ticker / skipped day instead. These enums exist
//! for genuine input-contract violations raised directly at a function call.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IndicatorError {
    #[error("insufficient history: need at least {need} rows, got {got}")]
    InsufficientHistory { need: usize, got: usize },
    #[error("invalid period: {0}")]
    InvalidPeriod(usize),
    #[error("MACD requires fast < slow (got fast={fast}, slow={slow})")]
    InvalidMacdSpans { fast: usize, slow: usize },
}

#[derive(Debug, Error, PartialEq)]
pub enum StageError {
    #[error("stage must be in 1..=6, got {0}")]
    InvalidStage(i32),
}

#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    #[error("strength threshold must be in [0, 100], got {0}")]
    InvalidStrengthThreshold(f64),
    #[error("min_slope must be >= 0, got {0}")]
    NegativeMinSlope(f64),
}

#[derive(Debug, Error, PartialEq)]
pub enum RiskError {
    #[error("account balance must be positive, got {0}")]
    NonPositiveBalance(f64),
    #[error("ATR must be positive, got {0}")]
    NonPositiveAtr(f64),
    #[error("risk_pct must be in (0, 1], got {0}")]
    InvalidRiskPct(f64),
    #[error("signal strength must be non-negative, got {0}")]
    NegativeStrength(f64),
    #[error("price must be positive, got {0}")]
    NonPositivePrice(f64),
}

#[derive(Debug, Error, PartialEq)]
pub enum ExecutionError {
    #[error("shares must be >= 1, got {0}")]
    InvalidShares(f64),
    #[error("market price must be positive, got {0}")]
    NonPositivePrice(f64),
    #[error("commission_rate must be >= 0, got {0}")]
    NegativeCommissionRate(f64),
    #[error("slippage_pct must be >= 0, got {0}")]
    NegativeSlippage(f64),
}

#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("insufficient cash: need {need:.2}, have {have:.2}")]
    InsufficientCash { need: f64, have: f64 },
    #[error("no open position for ticker {0}")]
    NoSuchPosition(String),
    #[error("cannot close {requested} shares, position holds only {held}")]
    OverClose { requested: f64, held: f64 },
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error for ticker {ticker}: {source}")]
    Io {
        ticker: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed bar table for ticker {ticker}: {reason}")]
    MalformedTable { ticker: String, reason: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("universe definition error: {0}")]
    UniverseParse(String),
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("empty universe")]
    EmptyUniverse,
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },
    #[error("initial_capital must be positive, got {0}")]
    NonPositiveCapital(f64),
}
