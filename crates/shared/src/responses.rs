//! Snapshot and response bodies
//!
//! Read-only projections of domain state sent over the WebSocket and REST
//! surfaces. Identities are plain strings (`"AI"` for the synthesized
//! opponent) and the battle id is a raw `uuid::Uuid`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use questarena_domain::{
    AiDifficulty, Battle, BattleMode, BattleStatus, Participant, Round, RoundAction, Skill,
    SkillKind,
};

// =============================================================================
// Battle snapshot
// =============================================================================

/// Full snapshot of a battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleData {
    pub id: Uuid,
    pub mode: BattleMode,
    pub status: BattleStatus,
    pub participants: Vec<ParticipantData>,
    pub rounds: Vec<RoundData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl BattleData {
    pub fn participant(&self, identity: &str) -> Option<&ParticipantData> {
        self.participants.iter().find(|p| p.identity == identity)
    }
}

impl From<&Battle> for BattleData {
    fn from(battle: &Battle) -> Self {
        Self {
            id: battle.id().to_uuid(),
            mode: battle.mode(),
            status: battle.status(),
            participants: battle
                .participants()
                .iter()
                .map(|p| ParticipantData::from_participant(p, battle.is_ready(p.identity())))
                .collect(),
            rounds: battle.rounds().iter().map(RoundData::from).collect(),
            winner: battle.winner().map(|w| w.to_string()),
            created_at: battle.created_at(),
            ended_at: battle.ended_at(),
        }
    }
}

/// One side of a battle snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantData {
    /// User id, or `"AI"`
    pub identity: String,
    pub display_name: String,
    pub loadout: Vec<String>,
    pub health: i32,
    pub max_health: i32,
    /// Skill id -> time the skill becomes usable again
    pub cooldown_expiry: BTreeMap<String, DateTime<Utc>>,
    pub is_ai: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_difficulty: Option<AiDifficulty>,
    pub ready: bool,
}

impl ParticipantData {
    fn from_participant(participant: &Participant, ready: bool) -> Self {
        Self {
            identity: participant.identity().to_string(),
            display_name: participant.display_name().to_string(),
            loadout: participant
                .loadout()
                .skills()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            health: participant.health(),
            max_health: participant.max_health(),
            cooldown_expiry: participant
                .cooldown_expiry()
                .iter()
                .map(|(skill, expiry)| (skill.to_string(), *expiry))
                .collect(),
            is_ai: participant.is_ai(),
            ai_difficulty: participant.ai_difficulty(),
            ready,
        }
    }
}

/// What a round's actor did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundActionData {
    UseSkill,
    Forfeit,
}

/// Numeric and narrative result of a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcomeData {
    pub damage: i32,
    pub healing: i32,
    pub narrative_text: String,
}

/// One entry of the combat log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundData {
    pub actor: String,
    pub action: RoundActionData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<String>,
    pub outcome: RoundOutcomeData,
    pub occurred_at: DateTime<Utc>,
}

impl From<&Round> for RoundData {
    fn from(round: &Round) -> Self {
        let (action, skill_id) = match &round.action {
            RoundAction::Skill(skill_id) => (RoundActionData::UseSkill, Some(skill_id.to_string())),
            RoundAction::Forfeit => (RoundActionData::Forfeit, None),
        };
        Self {
            actor: round.actor.to_string(),
            action,
            skill_id,
            outcome: RoundOutcomeData {
                damage: round.outcome.damage,
                healing: round.outcome.healing,
                narrative_text: round.outcome.narrative_text.clone(),
            },
            occurred_at: round.occurred_at,
        }
    }
}

// =============================================================================
// REST bodies
// =============================================================================

/// Catalog entry as listed by `GET /api/skills`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillData {
    pub id: String,
    pub display_name: String,
    pub power: i32,
    pub cooldown_seconds: i64,
    pub kind: SkillKind,
}

impl From<&Skill> for SkillData {
    fn from(skill: &Skill) -> Self {
        Self {
            id: skill.id().to_string(),
            display_name: skill.display_name().to_string(),
            power: skill.power(),
            cooldown_seconds: skill.cooldown_seconds(),
            kind: skill.kind(),
        }
    }
}

/// Liveness probe body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn ok(timestamp: DateTime<Utc>) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp,
        }
    }
}

/// Error body for REST failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
