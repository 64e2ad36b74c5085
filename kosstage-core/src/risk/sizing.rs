//! Position sizing: Turtle-style volatility sizing, signal-strength
//! scaling, and a capital cap.

use crate::error::RiskError;

/// Turtle unit size: `round((account_balance * risk_pct) / atr)`, in
/// whole shares.
pub fn calculate_unit_size(account_balance: f64, atr: f64, risk_pct: f64) -> Result<u64, RiskError> {
    if account_balance <= 0.0 {
        return Err(RiskError::NonPositiveBalance(account_balance));
    }
    if atr <= 0.0 {
        return Err(RiskError::NonPositiveAtr(atr));
    }
    if risk_pct <= 0.0 || risk_pct > 1.0 {
        return Err(RiskError::InvalidRiskPct(risk_pct));
    }
    let shares = (account_balance * risk_pct) / atr;
    Ok(shares.round() as u64)
}

/// Piecewise-constant multiplier applied to the base unit size: full
/// size at or above `threshold`, tapering down to zero below 50.
pub fn strength_multiplier(strength: f64, threshold: f64) -> f64 {
    if strength >= threshold {
        1.00
    } else if strength >= 70.0 {
        0.75
    } else if strength >= 60.0 {
        0.50
    } else if strength >= 50.0 {
        0.25
    } else {
        0.00
    }
}

/// Apply the signal-strength scaling to a base unit size, returning
/// whole shares. A negative base or strength is a hard error.
pub fn apply_strength_adjustment(base_shares: u64, strength: f64, threshold: f64) -> Result<u64, RiskError> {
    if strength < 0.0 {
        return Err(RiskError::NegativeStrength(strength));
    }
    let factor = strength_multiplier(strength, threshold);
    Ok((base_shares as f64 * factor).round() as u64)
}

/// Cap a position to `cap_ratio` of `account_balance` at `price`:
/// `floor(account * cap_ratio / price)`.
pub fn capital_cap(account_balance: f64, price: f64, cap_ratio: f64) -> Result<u64, RiskError> {
    if account_balance <= 0.0 {
        return Err(RiskError::NonPositiveBalance(account_balance));
    }
    if price <= 0.0 {
        return Err(RiskError::NonPositivePrice(price));
    }
    Ok(((account_balance * cap_ratio) / price).floor() as u64)
}

/// The final entry size: the tighter of the volatility-sized and
/// capital-capped shares.
pub fn final_entry_size(volatility_sized: u64, capital_sized: u64) -> u64 {
    volatility_sized.min(capital_sized)
}
