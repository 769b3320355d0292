//! Battle arena domain: skills, participants, the `Battle` state machine, the
//! skill resolver and XP rewards.
//!
//! Pure logic only. Time and randomness are passed in by the caller.

pub mod aggregates;
pub mod ai;
pub mod combat;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod rewards;
pub mod value_objects;

pub use aggregates::{Battle, BattleAction, BattleStatus, Round, RoundAction, RoundOutcome};
pub use ai::{choose_ai_loadout, choose_ai_skill};
pub use combat::{resolve, SkillEffect};
pub use entities::{
    CatalogError, Participant, ParticipantIdentity, Skill, SkillCatalog, SkillKind, AI_IDENTITY,
    AI_POOL_MIN,
};
pub use error::BattleError;
pub use events::{ActionOutcome, BattleResult, ReadyOutcome};
pub use ids::{BattleId, ConnectionId, SkillId, UserId};
pub use rewards::{BattleReport, XpAward};
pub use value_objects::{AiDifficulty, BattleMode, Loadout, LOADOUT_SIZE};
