//! Stop-loss derivation: volatility stop, trend stop, the combined
//! (stricter) stop, and the trailing-stop update.

use serde::{Deserialize, Serialize};

use crate::domain::{PositionSide, StopType};
use crate::error::RiskError;

/// `entry ∓ atr_mult * atr`, clamped to >= 0 for a long.
pub fn volatility_stop(entry: f64, atr: f64, atr_mult: f64, side: PositionSide) -> Result<f64, RiskError> {
    if entry <= 0.0 {
        return Err(RiskError::NonPositivePrice(entry));
    }
    if atr <= 0.0 {
        return Err(RiskError::NonPositiveAtr(atr));
    }
    Ok(match side {
        PositionSide::Long => (entry - atr_mult * atr).max(0.0),
        PositionSide::Short => entry + atr_mult * atr,
    })
}

/// `EMA_20` used directly as the stop reference, for either side — the
/// combining step (`combined_stop`) supplies the directionality.
pub fn trend_stop(ema_20: f64) -> f64 {
    ema_20
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedStop {
    pub stop_price: f64,
    pub stop_type: StopType,
    pub distance_abs: f64,
    pub distance_pct: f64,
    pub per_share_risk: f64,
}

/// The stricter of the volatility and trend stops: for a long, the
/// higher of the two (cuts losses sooner); for a short, the lower.
pub fn combined_stop(current_price: f64, entry_price: f64, side: PositionSide, volatility_stop: f64, trend_stop: f64) -> CombinedStop {
    let (stop_price, stop_type) = match side {
        PositionSide::Long => {
            if volatility_stop >= trend_stop {
                (volatility_stop, StopType::Volatility)
            } else {
                (trend_stop, StopType::Trend)
            }
        }
        PositionSide::Short => {
            if volatility_stop <= trend_stop {
                (volatility_stop, StopType::Volatility)
            } else {
                (trend_stop, StopType::Trend)
            }
        }
    };

    let distance_abs = (current_price - stop_price).abs();
    let distance_pct = if current_price > 0.0 { 100.0 * distance_abs / current_price } else { 0.0 };
    let per_share_risk = (entry_price - stop_price).abs();

    CombinedStop {
        stop_price,
        stop_type,
        distance_abs,
        distance_pct,
        per_share_risk,
    }
}

/// Candidate trailing stop for the next ratchet: the extreme-trailing
/// distance, folded with a break-even floor at `entry_price` so that
/// once any update occurs the stop never implies a loss. The caller
/// (`Position::ratchet_stop`) still enforces monotonicity; this
/// function only ever proposes a *tighter or equal* candidate.
pub fn trailing_stop_update(side: PositionSide, current_stop: f64, extreme_price: f64, atr: f64, atr_mult: f64, entry_price: f64) -> f64 {
    match side {
        PositionSide::Long => {
            let candidate = extreme_price - atr_mult * atr;
            current_stop.max(candidate).max(entry_price)
        }
        PositionSide::Short => {
            let candidate = extreme_price + atr_mult * atr;
            current_stop.min(candidate).min(entry_price)
        }
    }
}
