//! Inbound payloads
//!
//! Each WebSocket message type carries one of these as its `payload`; the REST
//! action endpoint takes `SubmitActionRequest` as its body.

use serde::{Deserialize, Serialize};

use questarena_domain::{BattleAction, SkillId};

use crate::messages::ProtocolError;

/// `join_arena`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinArenaPayload {
    pub user_id: String,
    /// Falls back to the stored profile when omitted
    #[serde(default)]
    pub username: Option<String>,
    /// Falls back to the stored loadout when omitted
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    /// `pve` or `pvp`
    pub mode: String,
    /// `easy`, `normal` or `hard`; PvE only
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// `battle_ready`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleReadyPayload {
    pub battle_id: String,
    pub user_id: String,
}

/// Kind of action a participant submits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    UseSkill,
    Forfeit,
}

impl ActionKind {
    /// Combine with the optional skill id into a domain action.
    pub fn into_battle_action(self, skill_id: Option<&str>) -> Result<BattleAction, ProtocolError> {
        match (self, skill_id) {
            (ActionKind::Forfeit, _) => Ok(BattleAction::Forfeit),
            (ActionKind::UseSkill, Some(skill_id)) if !skill_id.trim().is_empty() => {
                Ok(BattleAction::UseSkill(SkillId::new(skill_id)))
            }
            (ActionKind::UseSkill, _) => Err(ProtocolError::MissingField("skillId")),
        }
    }
}

/// `battle_action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleActionPayload {
    pub battle_id: String,
    pub action: ActionKind,
    #[serde(default)]
    pub skill_id: Option<String>,
    pub user_id: String,
}

impl BattleActionPayload {
    pub fn to_battle_action(&self) -> Result<BattleAction, ProtocolError> {
        self.action.into_battle_action(self.skill_id.as_deref())
    }
}

/// `leave_arena`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveArenaPayload {
    pub user_id: String,
}

/// `get_battle_state`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBattleStatePayload {
    pub battle_id: String,
}

/// `chat_message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub battle_id: String,
    pub username: String,
    pub message: String,
    pub user_id: String,
}

/// Body of `POST /api/battles/{id}/actions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitActionRequest {
    pub action: ActionKind,
    #[serde(default)]
    pub skill_id: Option<String>,
}

impl SubmitActionRequest {
    pub fn to_battle_action(&self) -> Result<BattleAction, ProtocolError> {
        self.action.into_battle_action(self.skill_id.as_deref())
    }
}
