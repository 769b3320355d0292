//! Error types for battle operations
//!
//! Every variant is a recoverable, user-visible rejection: the message text is
//! sent to the client as-is.

use thiserror::Error;

use crate::{BattleStatus, SkillId};

/// Unified error type for battle domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BattleError {
    /// Skill id is not present in the catalog
    #[error("Unknown skill: {0}")]
    UnknownSkill(SkillId),

    /// Skill exists but is not part of the actor's loadout
    #[error("Skill not in loadout: {0}")]
    SkillNotInLoadout(SkillId),

    /// Skill was used too recently
    #[error("Skill on cooldown")]
    SkillOnCooldown {
        skill_id: SkillId,
        remaining_seconds: i64,
    },

    /// Identity does not belong to this battle
    #[error("Not a participant in this battle")]
    NotParticipant,

    /// Battle is not accepting this operation in its current status
    #[error("Battle is not active")]
    SessionNotActive { status: BattleStatus },

    /// Loadout failed validation at join time
    #[error("Invalid loadout: {0}")]
    InvalidLoadout(String),

    /// Request field failed validation (e.g. unknown mode name)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Status change that would move the state machine backwards or skip a step
    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: BattleStatus, to: BattleStatus },
}

impl BattleError {
    /// Create an invalid loadout error
    pub fn invalid_loadout(msg: impl Into<String>) -> Self {
        Self::InvalidLoadout(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
