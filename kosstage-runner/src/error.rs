//! Orchestration-level error type: wraps every subsystem error that can
//! reach the day loop as a hard stop, as opposed to the per-ticker/
//! per-decision failures that are logged and demoted inside `kosstage-core`
//! itself.

use kosstage_core::error::{ExecutionError, OrchestratorError, PortfolioError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),
    #[error("no trading dates found in the loaded market data within the requested range")]
    NoTradingDates,
}
