//! Experience awarded when a battle ends.
//!
//! The winner's award depends on the mode (and, for PvE, the AI difficulty).
//! The loser receives a fixed share of it. AI participants earn nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregates::Battle;
use crate::entities::ParticipantIdentity;
use crate::value_objects::{AiDifficulty, BattleMode};
use crate::{BattleId, UserId};

/// Winner's award for a PvP battle.
pub const PVP_WINNER_XP: u32 = 120;

/// Percentage of the winner's award given to the loser.
pub const LOSER_SHARE_PERCENT: u32 = 30;

/// Winner's award for a battle of `mode` (PvE uses the AI difficulty).
pub fn winner_xp(mode: BattleMode, difficulty: Option<AiDifficulty>) -> u32 {
    match mode {
        BattleMode::Pvp => PVP_WINNER_XP,
        BattleMode::Pve => match difficulty.unwrap_or_default() {
            AiDifficulty::Easy => 50,
            AiDifficulty::Normal => 100,
            AiDifficulty::Hard => 150,
        },
    }
}

/// Loser's consolation award, floored.
pub fn loser_xp(winner_award: u32) -> u32 {
    winner_award * LOSER_SHARE_PERCENT / 100
}

/// XP granted to one human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpAward {
    pub user_id: UserId,
    pub xp: u32,
}

/// Outcome report sent to the profile store once per finished battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleReport {
    pub battle_id: BattleId,
    pub mode: BattleMode,
    pub winner: ParticipantIdentity,
    pub loser: ParticipantIdentity,
    pub forfeited: bool,
    /// Only humans appear here
    pub xp_awarded: Vec<XpAward>,
    pub ended_at: DateTime<Utc>,
}

impl BattleReport {
    /// Build the report for a finished battle. `None` while still running.
    pub fn from_battle(battle: &Battle) -> Option<Self> {
        let result = battle.result()?;
        let ended_at = battle.ended_at()?;
        let award = winner_xp(battle.mode(), battle.ai_difficulty());

        let xp_awarded = [
            (&result.winner, award),
            (&result.loser, loser_xp(award)),
        ]
        .into_iter()
        .filter_map(|(identity, xp)| {
            identity.user_id().map(|user_id| XpAward {
                user_id: user_id.clone(),
                xp,
            })
        })
        .collect();

        Some(Self {
            battle_id: battle.id(),
            mode: battle.mode(),
            winner: result.winner,
            loser: result.loser,
            forfeited: result.forfeited,
            xp_awarded,
            ended_at,
        })
    }

    pub fn xp_for(&self, user_id: &UserId) -> Option<u32> {
        self.xp_awarded
            .iter()
            .find(|award| &award.user_id == user_id)
            .map(|award| award.xp)
    }
}
