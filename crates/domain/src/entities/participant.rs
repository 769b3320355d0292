//! Battle participants - a human identity or a synthesized AI opponent.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entities::Skill;
use crate::value_objects::{AiDifficulty, Loadout};
use crate::{SkillId, UserId};

/// Wire form of the AI identity. Reserved: no user may authenticate as it.
pub const AI_IDENTITY: &str = "AI";

/// Who controls a participant.
///
/// Serializes as the bare user id, or `"AI"` for the synthesized opponent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParticipantIdentity {
    Human(UserId),
    Ai,
}

impl ParticipantIdentity {
    pub fn is_ai(&self) -> bool {
        matches!(self, ParticipantIdentity::Ai)
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            ParticipantIdentity::Human(user_id) => Some(user_id),
            ParticipantIdentity::Ai => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ParticipantIdentity::Human(user_id) => user_id.as_str(),
            ParticipantIdentity::Ai => AI_IDENTITY,
        }
    }
}

impl From<UserId> for ParticipantIdentity {
    fn from(value: UserId) -> Self {
        ParticipantIdentity::Human(value)
    }
}

impl fmt::Display for ParticipantIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ParticipantIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ParticipantIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == AI_IDENTITY {
            Ok(ParticipantIdentity::Ai)
        } else {
            Ok(ParticipantIdentity::Human(UserId::new(raw)))
        }
    }
}

/// One side of a battle.
///
/// # Invariants
///
/// - `0 <= health <= max_health`
/// - `loadout` never changes after construction
#[derive(Debug, Clone)]
pub struct Participant {
    identity: ParticipantIdentity,
    display_name: String,
    loadout: Loadout,
    health: i32,
    max_health: i32,
    cooldown_expiry: HashMap<SkillId, DateTime<Utc>>,
    ai_difficulty: Option<AiDifficulty>,
    /// Scales damage this participant deals
    damage_multiplier: f64,
}

impl Participant {
    /// A human participant at full health.
    pub fn human(
        user_id: UserId,
        display_name: impl Into<String>,
        loadout: Loadout,
        max_health: i32,
    ) -> Self {
        let max_health = max_health.max(1);
        Self {
            identity: ParticipantIdentity::Human(user_id),
            display_name: display_name.into(),
            loadout,
            health: max_health,
            max_health,
            cooldown_expiry: HashMap::new(),
            ai_difficulty: None,
            damage_multiplier: 1.0,
        }
    }

    /// A synthesized AI opponent scaled to `difficulty`.
    pub fn ai(difficulty: AiDifficulty, loadout: Loadout) -> Self {
        let max_health = difficulty.max_health();
        Self {
            identity: ParticipantIdentity::Ai,
            display_name: format!("AI Opponent ({})", difficulty),
            loadout,
            health: max_health,
            max_health,
            cooldown_expiry: HashMap::new(),
            ai_difficulty: Some(difficulty),
            damage_multiplier: difficulty.damage_multiplier(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_health(mut self, health: i32) -> Self {
        self.health = health.clamp(0, self.max_health);
        self
    }

    pub fn identity(&self) -> &ParticipantIdentity {
        &self.identity
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn is_ai(&self) -> bool {
        self.identity.is_ai()
    }

    pub fn ai_difficulty(&self) -> Option<AiDifficulty> {
        self.ai_difficulty
    }

    pub fn damage_multiplier(&self) -> f64 {
        self.damage_multiplier
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    pub fn cooldown_expiry(&self) -> &HashMap<SkillId, DateTime<Utc>> {
        &self.cooldown_expiry
    }

    /// Time left before `skill` can be used again, or `None` if it is ready.
    pub fn cooldown_remaining(&self, skill: &SkillId, now: DateTime<Utc>) -> Option<Duration> {
        self.cooldown_expiry
            .get(skill)
            .filter(|expiry| now < **expiry)
            .map(|expiry| *expiry - now)
    }

    pub fn is_on_cooldown(&self, skill: &SkillId, now: DateTime<Utc>) -> bool {
        self.cooldown_remaining(skill, now).is_some()
    }

    /// Loadout skills that are off cooldown at `now`, in loadout order.
    pub fn available_skills(&self, now: DateTime<Utc>) -> Vec<SkillId> {
        self.loadout
            .skills()
            .iter()
            .filter(|skill| !self.is_on_cooldown(skill, now))
            .cloned()
            .collect()
    }

    /// Lower health by `amount`, never below zero. Returns the new health.
    pub(crate) fn take_damage(&mut self, amount: i32) -> i32 {
        self.health = (self.health - amount.max(0)).max(0);
        self.health
    }

    /// Raise health by `amount`, never above max. Returns the amount actually restored.
    pub(crate) fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount.max(0)).min(self.max_health);
        self.health - before
    }

    pub(crate) fn start_cooldown(&mut self, skill: &Skill, now: DateTime<Utc>) {
        self.cooldown_expiry.insert(
            skill.id().clone(),
            now + Duration::seconds(skill.cooldown_seconds()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SkillCatalog;

    fn loadout() -> Loadout {
        let ids = ["fireball", "heal", "shield", "ice_shard"]
            .iter()
            .map(|s| SkillId::new(*s))
            .collect();
        Loadout::new(ids, &SkillCatalog::standard()).unwrap()
    }

    #[test]
    fn identity_serializes_as_bare_string() {
        let human = ParticipantIdentity::Human(UserId::new("u1"));
        assert_eq!(serde_json::to_string(&human).unwrap(), "\"u1\"");
        assert_eq!(serde_json::to_string(&ParticipantIdentity::Ai).unwrap(), "\"AI\"");
        let back: ParticipantIdentity = serde_json::from_str("\"AI\"").unwrap();
        assert!(back.is_ai());
    }

    #[test]
    fn damage_never_drops_health_below_zero() {
        let mut p = Participant::human(UserId::new("u1"), "Hero", loadout(), 100);
        assert_eq!(p.take_damage(250), 0);
        assert!(p.is_defeated());
    }

    #[test]
    fn heal_is_capped_at_max_health() {
        let mut p = Participant::human(UserId::new("u1"), "Hero", loadout(), 100).with_health(90);
        assert_eq!(p.heal(25), 10);
        assert_eq!(p.health(), 100);
    }

    #[test]
    fn cooldown_remaining_counts_down_to_none() {
        let catalog = SkillCatalog::standard();
        let fireball = catalog.get(&SkillId::new("fireball")).unwrap();
        let now = Utc::now();
        let mut p = Participant::human(UserId::new("u1"), "Hero", loadout(), 100);
        p.start_cooldown(fireball, now);

        assert_eq!(
            p.cooldown_remaining(fireball.id(), now + Duration::seconds(1)),
            Some(Duration::seconds(2))
        );
        assert!(p.cooldown_remaining(fireball.id(), now + Duration::seconds(3)).is_none());
        assert!(!p.available_skills(now).contains(fireball.id()));
    }

    #[test]
    fn ai_participant_uses_difficulty_table() {
        let ai = Participant::ai(AiDifficulty::Hard, loadout());
        assert_eq!(ai.health(), 120);
        assert_eq!(ai.max_health(), 120);
        assert!(ai.damage_multiplier() > 1.0);
        assert!(ai.is_ai());
        assert_eq!(ai.display_name(), "AI Opponent (Hard)");
    }
}
