//! Direction labeling — maps a scalar series to a closed {up, down, neutral}
//! enumeration by threshold, plus cross-series agreement.

use super::series::Series;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

/// Label a single value: `value > tau -> Up`, `value < -tau -> Down`,
/// else `Neutral`. `None -> Neutral`.
pub fn label(value: Option<f64>, tau: f64) -> Direction {
    match value {
        Some(v) if v > tau => Direction::Up,
        Some(v) if v < -tau => Direction::Down,
        _ => Direction::Neutral,
    }
}

/// Label an entire series with threshold `tau` (default 0.0).
pub fn directions(values: &Series, tau: f64) -> Vec<Direction> {
    values.iter().map(|v| label(*v, tau)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionAgreement {
    AllUp,
    AllDown,
    Mixed,
}

/// Aggregate agreement across the three MACD-line directions on one row:
/// `AllUp` iff every direction is `Up`; `AllDown` iff every direction is
/// `Down`; `Mixed` otherwise.
pub fn agreement(upper: Direction, middle: Direction, lower: Direction) -> DirectionAgreement {
    if upper == Direction::Up && middle == Direction::Up && lower == Direction::Up {
        DirectionAgreement::AllUp
    } else if upper == Direction::Down && middle == Direction::Down && lower == Direction::Down {
        DirectionAgreement::AllDown
    } else {
        DirectionAgreement::Mixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_up_down_neutral() {
        assert_eq!(label(Some(1.0), 0.0), Direction::Up);
        assert_eq!(label(Some(-1.0), 0.0), Direction::Down);
        assert_eq!(label(Some(0.0), 0.0), Direction::Neutral);
        assert_eq!(label(None, 0.0), Direction::Neutral);
    }

    #[test]
    fn threshold_applies_symmetrically() {
        assert_eq!(label(Some(0.05), 0.1), Direction::Neutral);
        assert_eq!(label(Some(0.15), 0.1), Direction::Up);
        assert_eq!(label(Some(-0.15), 0.1), Direction::Down);
    }

    #[test]
    fn agreement_all_up() {
        assert_eq!(
            agreement(Direction::Up, Direction::Up, Direction::Up),
            DirectionAgreement::AllUp
        );
    }

    #[test]
    fn agreement_all_down() {
        assert_eq!(
            agreement(Direction::Down, Direction::Down, Direction::Down),
            DirectionAgreement::AllDown
        );
    }

    #[test]
    fn agreement_mixed() {
        assert_eq!(
            agreement(Direction::Up, Direction::Down, Direction::Neutral),
            DirectionAgreement::Mixed
        );
    }
}
