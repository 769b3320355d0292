//! Arena use cases.
//!
//! Orchestrates matchmaking, per-battle actors, broadcasts and outcome
//! reporting around the `Battle` aggregate.

use std::sync::Arc;

use questarena_domain::BattleError;

mod actions;
mod battle_actor;
mod broadcast;
mod join;
mod leave;
mod matchmaking;
mod outcomes;
mod reaper;

pub use actions::BattleActions;
pub use battle_actor::{spawn_battle, BattleContext, BattleHandle};
pub use broadcast::BroadcastDispatcher;
pub use join::{Entrant, JoinArena, JoinOutcome, JoinSettings};
pub use leave::LeaveArena;
pub use matchmaking::{MatchmakingEntry, MatchmakingQueue, QueueGuard, QueueOutcome};
pub use outcomes::OutcomeRecorder;
pub use reaper::SessionReaper;

/// Errors surfaced by arena use cases. Messages go to clients verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("Battle not found")]
    BattleNotFound,
}

/// Container for arena use cases.
pub struct ArenaUseCases {
    pub join: Arc<JoinArena>,
    pub battle: Arc<BattleActions>,
    pub leave: Arc<LeaveArena>,
    pub reaper: Arc<SessionReaper>,
}

impl ArenaUseCases {
    pub fn new(
        join: Arc<JoinArena>,
        battle: Arc<BattleActions>,
        leave: Arc<LeaveArena>,
        reaper: Arc<SessionReaper>,
    ) -> Self {
        Self {
            join,
            battle,
            leave,
            reaper,
        }
    }
}
