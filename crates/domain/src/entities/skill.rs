//! Skills and the read-only skill catalog.
//!
//! The catalog is owned by an external collaborator; the arena only reads it.
//! `SkillCatalog::standard()` is the built-in table used when no catalog file
//! is configured.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::SkillId;

/// Minimum number of skills the AI-eligible pool must hold to build an AI loadout.
pub const AI_POOL_MIN: usize = 4;

/// What a skill does when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    Attack,
    Defense,
    Heal,
}

/// A single catalog entry.
///
/// # Invariants
///
/// - `power >= 0`
/// - `cooldown_seconds >= 0`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    id: SkillId,
    display_name: String,
    power: i32,
    cooldown_seconds: i64,
    kind: SkillKind,
    /// Whether synthesized AI opponents may draw this skill
    #[serde(default)]
    ai_eligible: bool,
}

impl Skill {
    pub fn new(
        id: impl Into<SkillId>,
        display_name: impl Into<String>,
        kind: SkillKind,
        power: i32,
        cooldown_seconds: i64,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            power,
            cooldown_seconds,
            kind,
            ai_eligible: false,
        }
    }

    /// Mark this skill as drawable by AI opponents.
    pub fn ai_eligible(mut self) -> Self {
        self.ai_eligible = true;
        self
    }

    pub fn id(&self) -> &SkillId {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn power(&self) -> i32 {
        self.power
    }

    pub fn cooldown_seconds(&self) -> i64 {
        self.cooldown_seconds
    }

    pub fn kind(&self) -> SkillKind {
        self.kind
    }

    pub fn is_ai_eligible(&self) -> bool {
        self.ai_eligible
    }
}

/// Errors raised while building a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Duplicate skill id: {0}")]
    DuplicateSkill(SkillId),
    #[error("Skill {0} has negative power or cooldown")]
    NegativeValue(SkillId),
    #[error("AI skill pool needs at least {AI_POOL_MIN} skills, found {0}")]
    AiPoolTooSmall(usize),
}

/// Read-only lookup table of skills keyed by id.
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    skills: BTreeMap<SkillId, Skill>,
}

impl SkillCatalog {
    /// Build a catalog, validating every entry.
    pub fn from_skills(skills: Vec<Skill>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for skill in skills {
            if skill.power < 0 || skill.cooldown_seconds < 0 {
                return Err(CatalogError::NegativeValue(skill.id));
            }
            if map.contains_key(&skill.id) {
                return Err(CatalogError::DuplicateSkill(skill.id));
            }
            map.insert(skill.id.clone(), skill);
        }

        let catalog = Self { skills: map };
        let pool = catalog.ai_pool().len();
        if pool < AI_POOL_MIN {
            return Err(CatalogError::AiPoolTooSmall(pool));
        }
        Ok(catalog)
    }

    /// The built-in arena catalog.
    pub fn standard() -> Self {
        let skills = vec![
            Skill::new("fireball", "Fireball", SkillKind::Attack, 35, 3).ai_eligible(),
            Skill::new("lightning_bolt", "Lightning Bolt", SkillKind::Attack, 40, 4).ai_eligible(),
            Skill::new("ice_shard", "Ice Shard", SkillKind::Attack, 25, 2).ai_eligible(),
            Skill::new("power_strike", "Power Strike", SkillKind::Attack, 30, 3),
            Skill::new("quick_jab", "Quick Jab", SkillKind::Attack, 15, 1).ai_eligible(),
            Skill::new("focus_blast", "Focus Blast", SkillKind::Attack, 50, 6),
            Skill::new("heal", "Heal", SkillKind::Heal, 25, 5).ai_eligible(),
            Skill::new("second_wind", "Second Wind", SkillKind::Heal, 15, 3),
            Skill::new("shield", "Shield", SkillKind::Defense, 0, 4).ai_eligible(),
            Skill::new("iron_will", "Iron Will", SkillKind::Defense, 0, 6),
        ];
        let mut map = BTreeMap::new();
        for skill in skills {
            map.insert(skill.id.clone(), skill);
        }
        Self { skills: map }
    }

    pub fn get(&self, id: &SkillId) -> Option<&Skill> {
        self.skills.get(id)
    }

    pub fn contains(&self, id: &SkillId) -> bool {
        self.skills.contains_key(id)
    }

    /// All skills in id order.
    pub fn skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    /// Skill ids AI opponents may draw from, in id order.
    pub fn ai_pool(&self) -> Vec<SkillId> {
        self.skills
            .values()
            .filter(|s| s.ai_eligible)
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl Default for SkillCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
