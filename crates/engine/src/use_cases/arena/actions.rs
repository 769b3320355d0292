//! Operations on an existing battle: actions, readiness, snapshots and chat.

use std::sync::Arc;

use questarena_domain::{BattleAction, BattleError, BattleId, ParticipantIdentity, UserId};
use questarena_shared::{BattleData, ServerMessage};

use super::{ArenaError, BattleHandle, BroadcastDispatcher};
use crate::infrastructure::ports::ClockPort;
use crate::stores::BattleStore;

/// Shared by the WebSocket and REST surfaces so both go through the same
/// battle actor.
pub struct BattleActions {
    battles: Arc<BattleStore>,
    broadcast: Arc<BroadcastDispatcher>,
    clock: Arc<dyn ClockPort>,
}

impl BattleActions {
    pub fn new(
        battles: Arc<BattleStore>,
        broadcast: Arc<BroadcastDispatcher>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            battles,
            broadcast,
            clock,
        }
    }

    fn handle(&self, battle_id: BattleId) -> Result<BattleHandle, ArenaError> {
        self.battles
            .get(battle_id)
            .ok_or(ArenaError::BattleNotFound)
    }

    /// Apply `action` as `user_id`. Returns the snapshot after the action.
    pub async fn submit(
        &self,
        battle_id: BattleId,
        user_id: UserId,
        action: BattleAction,
    ) -> Result<BattleData, ArenaError> {
        self.handle(battle_id)?
            .submit(ParticipantIdentity::Human(user_id), action)
            .await
    }

    pub async fn acknowledge_ready(
        &self,
        battle_id: BattleId,
        user_id: UserId,
    ) -> Result<BattleData, ArenaError> {
        self.handle(battle_id)?
            .acknowledge_ready(ParticipantIdentity::Human(user_id))
            .await
    }

    pub fn snapshot(&self, battle_id: BattleId) -> Result<BattleData, ArenaError> {
        Ok(self.handle(battle_id)?.snapshot())
    }

    /// Relay a chat line to both participants. Only participants may chat.
    /// Returns the delivered count.
    pub fn chat(
        &self,
        battle_id: BattleId,
        user_id: &UserId,
        username: String,
        message: String,
    ) -> Result<usize, ArenaError> {
        let handle = self.handle(battle_id)?;
        if !handle.involves(user_id) {
            return Err(BattleError::NotParticipant.into());
        }

        let snapshot = handle.snapshot();
        let chat = ServerMessage::ChatMessage {
            battle_id: snapshot.id,
            username,
            message,
            timestamp: self.clock.now(),
        };
        Ok(self.broadcast.fan_out(&snapshot, chat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::ports::MockConnectionPort;
    use crate::infrastructure::profile_store::InMemoryProfileStore;
    use crate::use_cases::arena::{spawn_battle, BattleContext, OutcomeRecorder};
    use chrono::{Duration, Utc};
    use questarena_domain::{Battle, Loadout, Participant, SkillCatalog, SkillId};

    fn setup(connections: MockConnectionPort) -> (BattleActions, BattleId) {
        let now = Utc::now();
        let clock: Arc<dyn ClockPort> = Arc::new(FixedClock(now));
        let broadcast = Arc::new(BroadcastDispatcher::new(Arc::new(connections)));
        let catalog = Arc::new(SkillCatalog::standard());
        let ctx = BattleContext {
            catalog: Arc::clone(&catalog),
            clock: Arc::clone(&clock),
            random: Arc::new(FixedRandom(0)),
            broadcast: Arc::clone(&broadcast),
            outcomes: OutcomeRecorder::new(Arc::new(InMemoryProfileStore::new()), None),
            ai_delay_min_ms: 10,
            ai_delay_max_ms: 10,
        };

        let loadout = || {
            Loadout::new(
                ["fireball", "heal", "shield", "quick_jab"]
                    .into_iter()
                    .map(SkillId::new)
                    .collect(),
                &catalog,
            )
            .unwrap()
        };
        let mut battle = Battle::pvp(
            BattleId::new(),
            Participant::human(UserId::new("alice"), "Alice", loadout(), 100),
            Participant::human(UserId::new("bob"), "Bob", loadout(), 100),
            now - Duration::seconds(1),
        )
        .unwrap();
        battle
            .acknowledge_ready(&ParticipantIdentity::Human(UserId::new("alice")))
            .unwrap();
        battle
            .acknowledge_ready(&ParticipantIdentity::Human(UserId::new("bob")))
            .unwrap();
        battle.start().unwrap();
        let battle_id = battle.id();

        let battles = Arc::new(BattleStore::new());
        battles.insert(spawn_battle(battle, ctx));
        (BattleActions::new(battles, broadcast, clock), battle_id)
    }

    fn silent() -> MockConnectionPort {
        let mut connections = MockConnectionPort::new();
        connections.expect_send_to_user().returning(|_, _| true);
        connections
    }

    #[tokio::test]
    async fn unknown_battle_is_not_found() {
        let (actions, _) = setup(silent());
        let err = actions
            .submit(BattleId::new(), UserId::new("alice"), BattleAction::Forfeit)
            .await
            .unwrap_err();
        assert_eq!(err, ArenaError::BattleNotFound);
        assert_eq!(err.to_string(), "Battle not found");
    }

    #[tokio::test]
    async fn second_fireball_within_cooldown_is_rejected() {
        let (actions, battle_id) = setup(silent());
        let fireball = BattleAction::UseSkill(SkillId::new("fireball"));

        let first = actions
            .submit(battle_id, UserId::new("alice"), fireball.clone())
            .await
            .unwrap();
        assert_eq!(first.participant("bob").unwrap().health, 65);

        let err = actions
            .submit(battle_id, UserId::new("alice"), fireball)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Skill on cooldown");
        assert_eq!(actions.snapshot(battle_id).unwrap().rounds.len(), 1);
    }

    #[tokio::test]
    async fn outsider_cannot_act_or_chat() {
        let (actions, battle_id) = setup(silent());

        let err = actions
            .submit(battle_id, UserId::new("mallory"), BattleAction::Forfeit)
            .await
            .unwrap_err();
        assert_eq!(err, ArenaError::Battle(BattleError::NotParticipant));

        let err = actions
            .chat(battle_id, &UserId::new("mallory"), "M".into(), "hi".into())
            .unwrap_err();
        assert_eq!(err, ArenaError::Battle(BattleError::NotParticipant));
    }

    #[tokio::test]
    async fn chat_reaches_both_participants() {
        let mut connections = MockConnectionPort::new();
        connections
            .expect_send_to_user()
            .withf(|_, message| {
                matches!(message, ServerMessage::ChatMessage { message, username, .. }
                    if message == "gg" && username == "Alice")
            })
            .times(2)
            .returning(|_, _| true);
        let (actions, battle_id) = setup(connections);

        let delivered = actions
            .chat(battle_id, &UserId::new("alice"), "Alice".into(), "gg".into())
            .unwrap();
        assert_eq!(delivered, 2);
    }

    #[tokio::test]
    async fn ready_after_start_is_rejected() {
        let (actions, battle_id) = setup(silent());
        let err = actions
            .acknowledge_ready(battle_id, UserId::new("alice"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ArenaError::Battle(BattleError::SessionNotActive { .. })
        ));
    }
}
