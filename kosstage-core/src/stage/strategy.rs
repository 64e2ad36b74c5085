//! Per-stage strategy metadata — human-facing descriptors for reporting
//! and manual review, not consulted by the signal engine itself.

use serde::{Deserialize, Serialize};

use crate::error::StageError;
use crate::indicators::direction::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendedAction {
    Buy,
    HoldOrExit,
    SellOrShort,
    ShortOrWait,
    CoverOrBuy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignmentStrength {
    Strong,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    pub up_count: usize,
    pub down_count: usize,
    pub neutral_count: usize,
    pub strength: AlignmentStrength,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageStrategy {
    pub stage: i32,
    pub name: String,
    pub market_phase: String,
    pub recommended_action: RecommendedAction,
    pub position_size_hint: String,
    pub risk_level: RiskLevel,
    pub description: String,
    pub key_points: Vec<String>,
    pub alignment: Option<AlignmentSummary>,
}

/// Strategy descriptor for `stage` (1..6), optionally enriched with an
/// alignment summary over the three MACD direction labels.
pub fn stage_strategy(
    stage: i32,
    macd_directions: Option<[Direction; 3]>,
) -> Result<StageStrategy, StageError> {
    let (name, market_phase, recommended_action, position_size_hint, risk_level, description, key_points) =
        match stage {
            1 => (
                "Stage 1: Stable Uptrend",
                "Mature uptrend, EMAs fully separated in ascending order",
                RecommendedAction::HoldOrExit,
                "hold existing size, no new entries",
                RiskLevel::High,
                "Short EMA leads over medium over long; the move is extended and a reversal risk builds.",
                vec![
                    "Favor trimming into strength over adding".to_string(),
                    "Watch the upper MACD for an early dead cross".to_string(),
                ],
            ),
            2 => (
                "Stage 2: Early Reversal Down",
                "Medium EMA overtakes short, long still trails",
                RecommendedAction::SellOrShort,
                "reduce to a partial position",
                RiskLevel::Medium,
                "First crack in the uptrend structure; momentum is turning before price confirms it.",
                vec![
                    "Early sell signal fires here when all three MACD lines point down".to_string(),
                    "Exit confidence is lower than Stage 3; expect false starts".to_string(),
                ],
            ),
            3 => (
                "Stage 3: Downtrend Confirming",
                "Medium EMA leads over long over short",
                RecommendedAction::SellOrShort,
                "full exit, consider short entries",
                RiskLevel::Low,
                "The reversal is now confirmed by arrangement; this is the higher-confidence sell point.",
                vec![
                    "Normal sell signal fires here when all three MACD lines point down".to_string(),
                    "Distance between EMAs typically still widening".to_string(),
                ],
            ),
            4 => (
                "Stage 4: Stable Downtrend",
                "Mature downtrend, EMAs fully separated in descending order",
                RecommendedAction::ShortOrWait,
                "hold short or stay flat",
                RiskLevel::High,
                "Symmetric to Stage 1: the move is extended and due for a reversal.",
                vec![
                    "Watch the lower MACD for an early golden cross".to_string(),
                    "New short entries here carry elevated reversal risk".to_string(),
                ],
            ),
            5 => (
                "Stage 5: Early Reversal Up",
                "Long EMA overtakes short, medium still trails",
                RecommendedAction::CoverOrBuy,
                "initiate a partial long position",
                RiskLevel::Medium,
                "First crack in the downtrend structure; momentum is turning before price confirms it.",
                vec![
                    "Early buy signal fires here when all three MACD lines point up".to_string(),
                    "Entry confidence is lower than Stage 6; expect false starts".to_string(),
                ],
            ),
            6 => (
                "Stage 6: Uptrend Confirming",
                "Short EMA leads over long over medium",
                RecommendedAction::Buy,
                "full entry size",
                RiskLevel::Low,
                "The reversal to the upside is now confirmed by arrangement; this is the higher-confidence buy point.",
                vec![
                    "Normal buy signal fires here when all three MACD lines point up".to_string(),
                    "Distance between EMAs typically still widening".to_string(),
                ],
            ),
            other => return Err(StageError::InvalidStage(other)),
        };

    let alignment = macd_directions.map(|dirs| {
        let up_count = dirs.iter().filter(|d| **d == Direction::Up).count();
        let down_count = dirs.iter().filter(|d| **d == Direction::Down).count();
        let neutral_count = dirs.len() - up_count - down_count;
        let strength = if up_count == 3 || down_count == 3 {
            AlignmentStrength::Strong
        } else {
            AlignmentStrength::Weak
        };
        AlignmentSummary {
            up_count,
            down_count,
            neutral_count,
            strength,
        }
    });

    Ok(StageStrategy {
        stage,
        name: name.to_string(),
        market_phase: market_phase.to_string(),
        recommended_action,
        position_size_hint: position_size_hint.to_string(),
        risk_level,
        description: description.to_string(),
        key_points,
        alignment,
    })
}
