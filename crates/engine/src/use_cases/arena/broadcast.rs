//! Best-effort fan-out of battle events to connected participants.

use std::sync::Arc;

use questarena_domain::UserId;
use questarena_shared::{BattleData, ServerMessage};

use crate::infrastructure::ports::ConnectionPort;

/// Sends battle events to every human participant with a live binding.
///
/// AI participants and disconnected humans are skipped. Delivery failures
/// are logged, never returned.
pub struct BroadcastDispatcher {
    connections: Arc<dyn ConnectionPort>,
}

impl BroadcastDispatcher {
    pub fn new(connections: Arc<dyn ConnectionPort>) -> Self {
        Self { connections }
    }

    /// `battle_update` with the given snapshot. Returns the delivered count.
    pub fn notify(&self, battle: &BattleData) -> usize {
        self.fan_out(battle, ServerMessage::battle_update(battle.clone()))
    }

    /// `battle_ready` with the given snapshot.
    pub fn notify_ready(&self, battle: &BattleData) -> usize {
        self.fan_out(battle, ServerMessage::battle_ready(battle.clone()))
    }

    /// Deliver `message` to each human participant of `battle`.
    pub fn fan_out(&self, battle: &BattleData, message: ServerMessage) -> usize {
        let mut delivered = 0;
        for user_id in human_recipients(battle) {
            if self.connections.send_to_user(&user_id, message.clone()) {
                delivered += 1;
            } else {
                tracing::debug!(
                    battle_id = %battle.id,
                    user_id = %user_id,
                    message_type = message.type_name(),
                    "Participant not reachable, skipping"
                );
            }
        }
        delivered
    }
}

fn human_recipients(battle: &BattleData) -> Vec<UserId> {
    battle
        .participants
        .iter()
        .filter(|p| !p.is_ai)
        .map(|p| UserId::new(p.identity.as_str()))
        .collect()
}
