//! MA spread and slope helpers — pure projections of already-computed EMA
//! columns, used by strength scoring and filtering.

use crate::indicators::series::sub;
use crate::indicators::slope::slope;
use crate::indicators::EnrichedTable;

pub const DEFAULT_MA_SLOPE_WINDOW: usize = 5;

/// Three signed spreads per row: EMA_5-EMA_20, EMA_20-EMA_40, EMA_5-EMA_40.
pub struct MaSpread {
    pub spread_5_20: crate::indicators::series::Series,
    pub spread_20_40: crate::indicators::series::Series,
    pub spread_5_40: crate::indicators::series::Series,
}

pub fn ma_spread(table: &EnrichedTable) -> MaSpread {
    MaSpread {
        spread_5_20: sub(&table.ema_5, &table.ema_20),
        spread_20_40: sub(&table.ema_20, &table.ema_40),
        spread_5_40: sub(&table.ema_5, &table.ema_40),
    }
}

/// Slope of each of EMA_5/EMA_20/EMA_40 over `window` rows (default 5).
pub struct MaSlope {
    pub slope_ema_5: crate::indicators::series::Series,
    pub slope_ema_20: crate::indicators::series::Series,
    pub slope_ema_40: crate::indicators::series::Series,
}

pub fn ma_slope(table: &EnrichedTable, window: usize) -> MaSlope {
    MaSlope {
        slope_ema_5: slope(&table.ema_5, window),
        slope_ema_20: slope(&table.ema_20, window),
        slope_ema_40: slope(&table.ema_40, window),
    }
}
