//! Domain entities.

mod participant;
mod skill;

pub use participant::{Participant, ParticipantIdentity, AI_IDENTITY};
pub use skill::{CatalogError, Skill, SkillCatalog, SkillKind, AI_POOL_MIN};
