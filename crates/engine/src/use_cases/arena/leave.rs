//! Leaving the arena: dequeue and forfeit running battles.

use std::sync::Arc;

use questarena_domain::{BattleAction, ParticipantIdentity, UserId};

use super::MatchmakingQueue;
use crate::stores::BattleStore;

/// Shared by explicit `leave_arena` and connection loss.
pub struct LeaveArena {
    queue: Arc<MatchmakingQueue>,
    battles: Arc<BattleStore>,
}

impl LeaveArena {
    pub fn new(queue: Arc<MatchmakingQueue>, battles: Arc<BattleStore>) -> Self {
        Self { queue, battles }
    }

    /// Remove `user_id` from the queue and forfeit every battle they are
    /// fighting. Returns the number of battles forfeited.
    ///
    /// Battles still waiting for the ready handshake are left to the reaper.
    pub async fn execute(&self, user_id: &UserId) -> usize {
        let running = {
            let mut queue = self.queue.lock().await;
            if queue.remove(user_id) {
                tracing::debug!(user_id = %user_id, "Removed from matchmaking queue");
            }
            // A pairing join inserts its battle before releasing the queue.
            self.battles.in_progress_for(user_id)
        };

        let mut forfeited = 0;
        for handle in running {
            match handle
                .submit(ParticipantIdentity::Human(user_id.clone()), BattleAction::Forfeit)
                .await
            {
                Ok(_) => {
                    forfeited += 1;
                    tracing::info!(
                        battle_id = %handle.id(),
                        user_id = %user_id,
                        "Participant left, battle forfeited"
                    );
                }
                // Finished between the lookup and the forfeit.
                Err(e) => tracing::debug!(
                    battle_id = %handle.id(),
                    user_id = %user_id,
                    error = %e,
                    "Forfeit on leave skipped"
                ),
            }
        }
        forfeited
    }
}
