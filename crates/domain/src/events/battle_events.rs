//! Battle-related domain events
//!
//! Return types of `Battle` mutations, so the engine can decide what to
//! broadcast, schedule, or report without re-inspecting the aggregate.

use serde::Serialize;

use crate::aggregates::Round;
use crate::entities::ParticipantIdentity;

/// Outcome of a successfully applied action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Round applied; the battle goes on
    Continued { round: Round },
    /// Round applied and the battle reached `Finished`
    Finished { round: Round, result: BattleResult },
}

impl ActionOutcome {
    pub fn round(&self) -> &Round {
        match self {
            ActionOutcome::Continued { round } | ActionOutcome::Finished { round, .. } => round,
        }
    }

    pub fn result(&self) -> Option<&BattleResult> {
        match self {
            ActionOutcome::Continued { .. } => None,
            ActionOutcome::Finished { result, .. } => Some(result),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, ActionOutcome::Finished { .. })
    }
}

/// Final result of a battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResult {
    pub winner: ParticipantIdentity,
    pub loser: ParticipantIdentity,
    /// The loser gave up rather than being reduced to zero health
    pub forfeited: bool,
}

/// Outcome of a participant acknowledging readiness
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// Recorded; still waiting on the other side
    Acknowledged { waiting_for: ParticipantIdentity },
    /// This participant had already acknowledged
    AlreadyAcknowledged,
    /// Both sides are ready; the battle moved to `Ready`
    AllReady,
}
