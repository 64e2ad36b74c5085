//! kosstage-core — indicator/stage pipeline, signal engine, risk manager,
//! portfolio, and execution simulator for a six-stage moving-average
//! trend-following strategy on the Korean equity market.
//!
//! The backtest orchestrator itself lives in `kosstage-runner`; this crate
//! is the pure, portfolio-agnostic-where-possible core it drives.

pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod risk;
pub mod signals;
pub mod stage;
