//! Historical data acquisition: a universe of tickers, a bulk loader
//! that turns raw bars into cached, annotated enriched tables, and the
//! on-disk cache those tables are written through to.

pub mod cache;
pub mod loader;
pub mod universe;

pub use cache::{CacheSummary, TableCache};
pub use loader::{load_market_data, BarProvider, LoadProgress, MarketDataset};
pub use universe::{StaticUniverse, UniverseProvider};
