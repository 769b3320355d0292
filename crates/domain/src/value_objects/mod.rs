//! Value objects for the arena domain.

mod difficulty;
mod loadout;

pub use difficulty::{AiDifficulty, BattleMode};
pub use loadout::{Loadout, LOADOUT_SIZE};
