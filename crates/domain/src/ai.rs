//! Decisions made on behalf of the synthesized AI opponent.
//!
//! Both helpers take a `pick(min, max)` closure returning an integer in
//! `min..=max`; the engine passes its `RandomPort`.

use crate::entities::SkillCatalog;
use crate::error::BattleError;
use crate::value_objects::{Loadout, LOADOUT_SIZE};
use crate::SkillId;

/// Draw a random loadout from the catalog's AI-eligible pool.
pub fn choose_ai_loadout<R>(catalog: &SkillCatalog, pick: &mut R) -> Result<Loadout, BattleError>
where
    R: FnMut(i32, i32) -> i32,
{
    let mut pool = catalog.ai_pool();
    if pool.len() < LOADOUT_SIZE {
        return Err(BattleError::invalid_loadout(format!(
            "AI skill pool has {} skills, needs {}",
            pool.len(),
            LOADOUT_SIZE
        )));
    }

    // Partial Fisher-Yates: the first LOADOUT_SIZE slots end up a uniform sample.
    let last = pool.len() - 1;
    for i in 0..LOADOUT_SIZE {
        let j = pick(i as i32, last as i32).clamp(i as i32, last as i32) as usize;
        pool.swap(i, j);
    }
    pool.truncate(LOADOUT_SIZE);

    Loadout::new(pool, catalog)
}

/// Pick one of `available` uniformly, or `None` if nothing is off cooldown.
pub fn choose_ai_skill<R>(available: &[SkillId], pick: &mut R) -> Option<SkillId>
where
    R: FnMut(i32, i32) -> i32,
{
    if available.is_empty() {
        return None;
    }
    let last = available.len() as i32 - 1;
    let index = pick(0, last).clamp(0, last) as usize;
    available.get(index).cloned()
}
