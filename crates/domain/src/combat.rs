//! Skill resolution.
//!
//! `resolve` is a pure function: it reads actor and target state and returns
//! the effect, leaving mutation (and cooldown stamping) to the battle aggregate.
//! Randomness is injected as a closure `roll(min, max)` returning an integer in
//! `min..=max`, so callers can make results deterministic in tests.

use serde::{Deserialize, Serialize};

use crate::entities::{Participant, SkillCatalog, SkillKind};
use crate::error::BattleError;
use crate::SkillId;

/// Upper bound of the attack roll. `floor(uniform[0, 10))` is an integer in `0..=9`.
pub const ATTACK_ROLL_MAX: i32 = 9;

/// Upper bound of the heal roll. `floor(uniform[0, 5))` is an integer in `0..=4`.
pub const HEAL_ROLL_MAX: i32 = 4;

/// Computed outcome of one skill use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEffect {
    pub damage_dealt: i32,
    pub healing_applied: i32,
    pub effect_text: String,
}

/// Compute the effect of `actor` using `skill_id` against `target`.
///
/// Cooldowns are not checked here.
pub fn resolve<R>(
    catalog: &SkillCatalog,
    skill_id: &SkillId,
    actor: &Participant,
    target: &Participant,
    roll: &mut R,
) -> Result<SkillEffect, BattleError>
where
    R: FnMut(i32, i32) -> i32,
{
    let skill = catalog
        .get(skill_id)
        .ok_or_else(|| BattleError::UnknownSkill(skill_id.clone()))?;

    let effect = match skill.kind() {
        SkillKind::Attack => {
            let base = skill.power() + roll(0, ATTACK_ROLL_MAX).clamp(0, ATTACK_ROLL_MAX);
            let scaled = (f64::from(base) * actor.damage_multiplier()).floor() as i32;
            let damage = scaled.max(0);
            SkillEffect {
                damage_dealt: damage,
                healing_applied: 0,
                effect_text: format!(
                    "{} used {} and dealt {} damage to {}!",
                    actor.display_name(),
                    skill.display_name(),
                    damage,
                    target.display_name()
                ),
            }
        }
        SkillKind::Heal => {
            let healing = (skill.power() + roll(0, HEAL_ROLL_MAX).clamp(0, HEAL_ROLL_MAX)).max(0);
            SkillEffect {
                damage_dealt: 0,
                healing_applied: healing,
                effect_text: format!(
                    "{} used {} and restored {} health!",
                    actor.display_name(),
                    skill.display_name(),
                    healing
                ),
            }
        }
        // Narrative only: no mitigation is applied to the next hit.
        SkillKind::Defense => SkillEffect {
            damage_dealt: 0,
            healing_applied: 0,
            effect_text: format!(
                "{} used {} and braced for the next attack!",
                actor.display_name(),
                skill.display_name()
            ),
        },
    };

    Ok(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{AiDifficulty, Loadout};
    use crate::UserId;

    fn loadout(catalog: &SkillCatalog) -> Loadout {
        let ids = ["fireball", "heal", "shield", "ice_shard"]
            .iter()
            .map(|s| SkillId::new(*s))
            .collect();
        Loadout::new(ids, catalog).unwrap()
    }

    fn human(catalog: &SkillCatalog) -> Participant {
        Participant::human(UserId::new("hero"), "Hero", loadout(catalog), 100)
    }

    #[test]
    fn attack_adds_roll_to_power() {
        let catalog = SkillCatalog::standard();
        let actor = human(&catalog);
        let target = Participant::ai(AiDifficulty::Normal, loadout(&catalog));

        let effect = resolve(
            &catalog,
            &SkillId::new("fireball"),
            &actor,
            &target,
            &mut |_, _| 7,
        )
        .unwrap();

        assert_eq!(effect.damage_dealt, 42);
        assert_eq!(effect.healing_applied, 0);
        assert!(effect.effect_text.contains("Fireball"));
    }

    #[test]
    fn attack_is_scaled_by_actor_multiplier_and_floored() {
        let catalog = SkillCatalog::standard();
        let actor = Participant::ai(AiDifficulty::Hard, loadout(&catalog));
        let target = human(&catalog);

        // (35 + 2) * 1.25 = 46.25
        let effect = resolve(
            &catalog,
            &SkillId::new("fireball"),
            &actor,
            &target,
            &mut |_, _| 2,
        )
        .unwrap();
        assert_eq!(effect.damage_dealt, 46);
    }

    #[test]
    fn out_of_range_rolls_are_clamped() {
        let catalog = SkillCatalog::standard();
        let actor = human(&catalog);
        let target = human(&catalog);

        let high = resolve(&catalog, &SkillId::new("heal"), &actor, &target, &mut |_, _| 99)
            .unwrap();
        assert_eq!(high.healing_applied, 25 + HEAL_ROLL_MAX);

        let low = resolve(&catalog, &SkillId::new("ice_shard"), &actor, &target, &mut |_, _| -50)
            .unwrap();
        assert_eq!(low.damage_dealt, 25);
    }

    #[test]
    fn defense_has_no_numeric_effect() {
        let catalog = SkillCatalog::standard();
        let actor = human(&catalog);
        let target = human(&catalog);

        let effect =
            resolve(&catalog, &SkillId::new("shield"), &actor, &target, &mut |_, _| 5).unwrap();
        assert_eq!(effect.damage_dealt, 0);
        assert_eq!(effect.healing_applied, 0);
        assert!(effect.effect_text.contains("braced"));
    }

    #[test]
    fn unknown_skill_fails() {
        let catalog = SkillCatalog::standard();
        let actor = human(&catalog);
        let target = human(&catalog);

        let err = resolve(&catalog, &SkillId::new("meteor"), &actor, &target, &mut |_, _| 0)
            .unwrap_err();
        assert_eq!(err, BattleError::UnknownSkill(SkillId::new("meteor")));
    }

    #[test]
    fn roll_bounds_match_floor_of_uniform_range() {
        let catalog = SkillCatalog::standard();
        let actor = human(&catalog);
        let target = human(&catalog);
        let mut seen = Vec::new();

        resolve(&catalog, &SkillId::new("fireball"), &actor, &target, &mut |min, max| {
            seen.push((min, max));
            min
        })
        .unwrap();
        resolve(&catalog, &SkillId::new("heal"), &actor, &target, &mut |min, max| {
            seen.push((min, max));
            min
        })
        .unwrap();

        assert_eq!(seen, vec![(0, ATTACK_ROLL_MAX), (0, HEAL_ROLL_MAX)]);
    }
}
