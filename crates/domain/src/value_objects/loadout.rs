//! Loadout - the fixed skill set a participant brings into a battle

use serde::Serialize;

use crate::entities::SkillCatalog;
use crate::error::BattleError;
use crate::SkillId;

/// Number of skills in every loadout.
pub const LOADOUT_SIZE: usize = 4;

/// Exactly four distinct catalog skills, chosen at join time.
///
/// # Invariants
///
/// - exactly `LOADOUT_SIZE` entries (enforced by the array type)
/// - no duplicates
/// - every id exists in the catalog the loadout was validated against
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Loadout([SkillId; LOADOUT_SIZE]);

impl Loadout {
    /// Validate a requested skill list against the catalog.
    pub fn new(skills: Vec<SkillId>, catalog: &SkillCatalog) -> Result<Self, BattleError> {
        let count = skills.len();
        let skills: [SkillId; LOADOUT_SIZE] = skills.try_into().map_err(|_| {
            BattleError::invalid_loadout(format!(
                "expected exactly {} skills, got {}",
                LOADOUT_SIZE, count
            ))
        })?;

        for (i, skill) in skills.iter().enumerate() {
            if skills[..i].contains(skill) {
                return Err(BattleError::invalid_loadout(format!(
                    "duplicate skill {}",
                    skill
                )));
            }
            if !catalog.contains(skill) {
                return Err(BattleError::UnknownSkill(skill.clone()));
            }
        }

        Ok(Self(skills))
    }

    pub fn skills(&self) -> &[SkillId] {
        &self.0
    }

    pub fn contains(&self, skill: &SkillId) -> bool {
        self.0.contains(skill)
    }

    pub fn to_vec(&self) -> Vec<SkillId> {
        self.0.to_vec()
    }
}
