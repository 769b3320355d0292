//! Joining the arena: loadout resolution, PvE battle creation and PvP
//! matchmaking.

use std::sync::Arc;

use questarena_domain::{
    choose_ai_loadout, AiDifficulty, Battle, BattleError, BattleId, BattleMode, Loadout,
    Participant, ParticipantIdentity, SkillId, UserId,
};
use questarena_shared::BattleData;

use super::{
    spawn_battle, ArenaError, BattleContext, MatchmakingEntry, MatchmakingQueue, QueueOutcome,
};
use crate::infrastructure::ports::{PlayerProfile, ProfileStore};
use crate::stores::BattleStore;

/// A player about to enter the arena, with a validated loadout.
#[derive(Debug, Clone)]
pub struct Entrant {
    pub user_id: UserId,
    pub display_name: String,
    pub loadout: Loadout,
}

#[derive(Debug, Clone)]
pub enum JoinOutcome {
    /// A battle was created; `battle_ready` has been broadcast.
    Matched(BattleData),
    /// Waiting for a PvP opponent.
    Searching { queue_position: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct JoinSettings {
    pub player_max_health: i32,
    /// PvP battles stay `Waiting` until both players send `battle_ready`
    pub pvp_ready_handshake: bool,
}

pub struct JoinArena {
    profiles: Arc<dyn ProfileStore>,
    queue: Arc<MatchmakingQueue>,
    battles: Arc<BattleStore>,
    ctx: BattleContext,
    settings: JoinSettings,
}

impl JoinArena {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        queue: Arc<MatchmakingQueue>,
        battles: Arc<BattleStore>,
        ctx: BattleContext,
        settings: JoinSettings,
    ) -> Self {
        Self {
            profiles,
            queue,
            battles,
            ctx,
            settings,
        }
    }

    /// Fill in display name and loadout, falling back to the stored profile
    /// for whatever the request omitted.
    pub async fn resolve_entrant(
        &self,
        user_id: UserId,
        username: Option<String>,
        skills: Option<Vec<String>>,
    ) -> Result<Entrant, ArenaError> {
        let username = username
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let profile = if username.is_none() || skills.is_none() {
            self.load_profile(&user_id).await
        } else {
            None
        };

        let display_name = username
            .or_else(|| profile.as_ref().map(|p| p.display_name.clone()))
            .unwrap_or_else(|| user_id.to_string());

        let skills = match skills {
            Some(skills) => skills.into_iter().map(SkillId::from).collect(),
            None => profile.map(|p| p.loadout).ok_or_else(|| {
                BattleError::invalid_loadout("no skills selected and no saved loadout")
            })?,
        };
        let loadout = Loadout::new(skills, &self.ctx.catalog)?;

        Ok(Entrant {
            user_id,
            display_name,
            loadout,
        })
    }

    async fn load_profile(&self, user_id: &UserId) -> Option<PlayerProfile> {
        match self.profiles.load_profile(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Profile lookup failed, continuing without");
                None
            }
        }
    }

    /// Enter a PvE battle or the PvP queue.
    pub async fn enter(
        &self,
        entrant: Entrant,
        mode: BattleMode,
        difficulty: Option<AiDifficulty>,
    ) -> Result<JoinOutcome, ArenaError> {
        match mode {
            BattleMode::Pve => self
                .start_pve(entrant, difficulty.unwrap_or_default())
                .map(JoinOutcome::Matched),
            BattleMode::Pvp => self.enter_pvp(entrant).await,
        }
    }

    fn start_pve(
        &self,
        entrant: Entrant,
        difficulty: AiDifficulty,
    ) -> Result<BattleData, ArenaError> {
        let random = Arc::clone(&self.ctx.random);
        let ai_loadout =
            choose_ai_loadout(&self.ctx.catalog, &mut |min, max| random.gen_range(min, max))?;

        let human = Participant::human(
            entrant.user_id,
            entrant.display_name,
            entrant.loadout,
            self.settings.player_max_health,
        );
        let ai = Participant::ai(difficulty, ai_loadout);
        let battle = Battle::pve(self.next_battle_id(), human, ai, self.ctx.clock.now())?;

        tracing::info!(
            battle_id = %battle.id(),
            difficulty = %difficulty,
            "PvE battle created"
        );
        Ok(self.launch(battle))
    }

    async fn enter_pvp(&self, entrant: Entrant) -> Result<JoinOutcome, ArenaError> {
        let entry = MatchmakingEntry {
            user_id: entrant.user_id.clone(),
            display_name: entrant.display_name.clone(),
            loadout: entrant.loadout.clone(),
            queued_at: self.ctx.clock.now(),
        };

        // Held until the battle is in the store.
        let mut queue = self.queue.lock().await;
        let opponent = match queue.pair_or_enqueue(entry) {
            QueueOutcome::Paired(opponent) => opponent,
            QueueOutcome::Queued { position } => {
                tracing::debug!(user_id = %entrant.user_id, position, "Queued for PvP");
                return Ok(JoinOutcome::Searching {
                    queue_position: position,
                });
            }
        };

        let max_health = self.settings.player_max_health;
        let first = Participant::human(
            opponent.user_id,
            opponent.display_name,
            opponent.loadout,
            max_health,
        );
        let second = Participant::human(
            entrant.user_id,
            entrant.display_name,
            entrant.loadout,
            max_health,
        );
        let mut battle = Battle::pvp(self.next_battle_id(), first, second, self.ctx.clock.now())?;

        if !self.settings.pvp_ready_handshake {
            let identities: Vec<ParticipantIdentity> = battle
                .participants()
                .iter()
                .map(|p| p.identity().clone())
                .collect();
            for identity in &identities {
                battle.acknowledge_ready(identity)?;
            }
            battle.start()?;
        }

        tracing::info!(
            battle_id = %battle.id(),
            status = %battle.status(),
            "PvP battle created"
        );
        let snapshot = self.launch(battle);
        drop(queue);
        Ok(JoinOutcome::Matched(snapshot))
    }

    fn next_battle_id(&self) -> BattleId {
        BattleId::from_uuid(self.ctx.random.gen_uuid())
    }

    fn launch(&self, battle: Battle) -> BattleData {
        let handle = spawn_battle(battle, self.ctx.clone());
        let snapshot = handle.snapshot();
        self.battles.insert(handle);
        self.ctx.broadcast.notify_ready(&snapshot);
        snapshot
    }
}
