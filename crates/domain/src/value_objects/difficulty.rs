//! Battle mode and AI difficulty scaling
//!
//! - BattleMode: who the opponent is (synthesized AI or another human)
//! - AiDifficulty: health and damage scaling for synthesized AI opponents

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BattleError;

/// Who a participant wants to fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleMode {
    /// Player versus a synthesized AI opponent
    Pve,
    /// Player versus another human
    Pvp,
}

impl fmt::Display for BattleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleMode::Pve => write!(f, "pve"),
            BattleMode::Pvp => write!(f, "pvp"),
        }
    }
}

impl FromStr for BattleMode {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pve" => Ok(BattleMode::Pve),
            "pvp" => Ok(BattleMode::Pvp),
            other => Err(BattleError::validation(format!(
                "unknown battle mode: {}",
                other
            ))),
        }
    }
}

/// Difficulty of a synthesized AI opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AiDifficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl AiDifficulty {
    /// Starting and maximum health of an AI at this difficulty.
    pub fn max_health(self) -> i32 {
        match self {
            AiDifficulty::Easy => 80,
            AiDifficulty::Normal => 100,
            AiDifficulty::Hard => 120,
        }
    }

    /// Multiplier applied to damage the AI deals.
    pub fn damage_multiplier(self) -> f64 {
        match self {
            AiDifficulty::Easy => 0.8,
            AiDifficulty::Normal => 1.0,
            AiDifficulty::Hard => 1.25,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AiDifficulty::Easy => "Easy",
            AiDifficulty::Normal => "Normal",
            AiDifficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for AiDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AiDifficulty {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "normal" | "medium" => Ok(AiDifficulty::Normal),
            "hard" => Ok(AiDifficulty::Hard),
            other => Err(BattleError::validation(format!(
                "unknown difficulty: {}",
                other
            ))),
        }
    }
}
