//! Domain types: bars, positions, portfolio, and the trade ledger.

pub mod bar;
pub mod portfolio;
pub mod position;

pub use bar::Bar;
pub use portfolio::{Portfolio, Snapshot, TradeRecord};
pub use position::{Position, PositionSide, StopType};

/// Korean six-digit ticker symbol, kept as a plain `String` alias so callers
/// don't need a newtype to interoperate with the data-provider boundary.
pub type Ticker = String;
