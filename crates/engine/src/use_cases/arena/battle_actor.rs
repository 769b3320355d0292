//! Per-battle actor.
//!
//! Each live battle is owned by exactly one tokio task that drains a command
//! channel. Every mutation goes through that task, so actions on one battle
//! are applied strictly in arrival order. The latest snapshot is published on
//! a `watch` channel for lock-free reads.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use questarena_domain::{
    choose_ai_skill, Battle, BattleAction, BattleId, BattleStatus, ParticipantIdentity,
    ReadyOutcome, SkillCatalog, UserId,
};
use questarena_shared::BattleData;

use super::{ArenaError, BroadcastDispatcher, OutcomeRecorder};
use crate::infrastructure::ports::{ClockPort, RandomPort};

const COMMAND_BUFFER: usize = 64;

type Reply = oneshot::Sender<Result<BattleData, ArenaError>>;

enum BattleCommand {
    Submit {
        identity: ParticipantIdentity,
        action: BattleAction,
        reply: Reply,
    },
    AcknowledgeReady {
        identity: ParticipantIdentity,
        reply: Reply,
    },
    AiTurn,
}

/// Collaborators shared by every battle actor.
#[derive(Clone)]
pub struct BattleContext {
    pub catalog: Arc<SkillCatalog>,
    pub clock: Arc<dyn ClockPort>,
    pub random: Arc<dyn RandomPort>,
    pub broadcast: Arc<BroadcastDispatcher>,
    pub outcomes: OutcomeRecorder,
    pub ai_delay_min_ms: u64,
    pub ai_delay_max_ms: u64,
}

impl BattleContext {
    fn ai_delay(&self) -> Duration {
        let min = self.ai_delay_min_ms;
        let max = self.ai_delay_max_ms.max(min);
        let to_i32 = |ms: u64| i32::try_from(ms).unwrap_or(i32::MAX);
        let rolled = self.random.gen_range(to_i32(min), to_i32(max));
        let ms = u64::try_from(rolled).unwrap_or(min).clamp(min, max);
        Duration::from_millis(ms)
    }
}

/// Cloneable address of a running battle actor.
#[derive(Clone)]
pub struct BattleHandle {
    id: BattleId,
    created_at: DateTime<Utc>,
    participants: [ParticipantIdentity; 2],
    commands: mpsc::Sender<BattleCommand>,
    state: watch::Receiver<BattleData>,
}

impl BattleHandle {
    pub fn id(&self) -> BattleId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Latest published state.
    pub fn snapshot(&self) -> BattleData {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> BattleStatus {
        self.state.borrow().status
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.state.borrow().ended_at
    }

    pub fn involves(&self, user_id: &UserId) -> bool {
        self.participants
            .iter()
            .any(|p| p.user_id() == Some(user_id))
    }

    pub async fn submit(
        &self,
        identity: ParticipantIdentity,
        action: BattleAction,
    ) -> Result<BattleData, ArenaError> {
        let (reply, response) = oneshot::channel();
        self.request(
            BattleCommand::Submit {
                identity,
                action,
                reply,
            },
            response,
        )
        .await
    }

    pub async fn acknowledge_ready(
        &self,
        identity: ParticipantIdentity,
    ) -> Result<BattleData, ArenaError> {
        let (reply, response) = oneshot::channel();
        self.request(BattleCommand::AcknowledgeReady { identity, reply }, response)
            .await
    }

    async fn request(
        &self,
        command: BattleCommand,
        response: oneshot::Receiver<Result<BattleData, ArenaError>>,
    ) -> Result<BattleData, ArenaError> {
        // A closed mailbox means the battle was reaped.
        self.commands
            .send(command)
            .await
            .map_err(|_| ArenaError::BattleNotFound)?;
        response.await.map_err(|_| ArenaError::BattleNotFound)?
    }
}

/// Start the actor task for `battle` and return its handle.
pub fn spawn_battle(battle: Battle, ctx: BattleContext) -> BattleHandle {
    let (commands, mailbox) = mpsc::channel(COMMAND_BUFFER);
    let (state, state_rx) = watch::channel(BattleData::from(&battle));

    let handle = BattleHandle {
        id: battle.id(),
        created_at: battle.created_at(),
        participants: [
            battle.participants()[0].identity().clone(),
            battle.participants()[1].identity().clone(),
        ],
        commands: commands.clone(),
        state: state_rx,
    };

    let actor = BattleActor {
        battle,
        ctx,
        state,
        myself: commands.downgrade(),
        pending_ai: None,
    };
    tokio::spawn(actor.run(mailbox));

    handle
}

struct BattleActor {
    battle: Battle,
    ctx: BattleContext,
    state: watch::Sender<BattleData>,
    myself: mpsc::WeakSender<BattleCommand>,
    pending_ai: Option<JoinHandle<()>>,
}

impl BattleActor {
    async fn run(mut self, mut mailbox: mpsc::Receiver<BattleCommand>) {
        let battle_id = self.battle.id();
        tracing::debug!(battle_id = %battle_id, mode = %self.battle.mode(), "Battle actor started");

        while let Some(command) = mailbox.recv().await {
            match command {
                BattleCommand::Submit {
                    identity,
                    action,
                    reply,
                } => {
                    let result = self.apply(&identity, action);
                    let _ = reply.send(result);
                }
                BattleCommand::AcknowledgeReady { identity, reply } => {
                    let result = self.acknowledge_ready(&identity);
                    let _ = reply.send(result);
                }
                BattleCommand::AiTurn => self.ai_turn(),
            }
        }

        if let Some(pending) = self.pending_ai.take() {
            pending.abort();
        }
        tracing::debug!(battle_id = %battle_id, "Battle actor stopped");
    }

    fn publish(&self) -> BattleData {
        let snapshot = BattleData::from(&self.battle);
        self.state.send_replace(snapshot.clone());
        snapshot
    }

    fn apply(
        &mut self,
        identity: &ParticipantIdentity,
        action: BattleAction,
    ) -> Result<BattleData, ArenaError> {
        let now = self.ctx.clock.now();
        let random = Arc::clone(&self.ctx.random);
        let outcome = self.battle.submit_action(
            identity,
            action,
            &self.ctx.catalog,
            now,
            &mut |min, max| random.gen_range(min, max),
        )?;

        let snapshot = self.publish();
        self.ctx.broadcast.notify(&snapshot);

        if let Some(result) = outcome.result() {
            tracing::info!(
                battle_id = %self.battle.id(),
                winner = %result.winner,
                rounds = self.battle.rounds().len(),
                forfeited = result.forfeited,
                "Battle finished"
            );
            if let Some(pending) = self.pending_ai.take() {
                pending.abort();
            }
            self.ctx.outcomes.record(&self.battle);
        } else if !identity.is_ai() && self.battle.ai_participant().is_some() {
            self.schedule_ai_turn();
        }

        Ok(snapshot)
    }

    fn acknowledge_ready(
        &mut self,
        identity: &ParticipantIdentity,
    ) -> Result<BattleData, ArenaError> {
        match self.battle.acknowledge_ready(identity)? {
            ReadyOutcome::AllReady => {
                self.battle.start()?;
                tracing::info!(battle_id = %self.battle.id(), "Both players ready, battle started");
                let snapshot = self.publish();
                self.ctx.broadcast.notify_ready(&snapshot);
                return Ok(snapshot);
            }
            ReadyOutcome::Acknowledged { waiting_for } => {
                tracing::debug!(
                    battle_id = %self.battle.id(),
                    ready = %identity,
                    waiting_for = %waiting_for,
                    "Ready acknowledged"
                );
            }
            ReadyOutcome::AlreadyAcknowledged => return Ok(BattleData::from(&self.battle)),
        }

        let snapshot = self.publish();
        self.ctx.broadcast.notify(&snapshot);
        Ok(snapshot)
    }

    fn schedule_ai_turn(&mut self) {
        if self
            .pending_ai
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
        {
            return;
        }

        let delay = self.ctx.ai_delay();
        let mailbox = self.myself.clone();
        self.pending_ai = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The battle may have been reaped while we slept.
            if let Some(mailbox) = mailbox.upgrade() {
                let _ = mailbox.send(BattleCommand::AiTurn).await;
            }
        }));
    }

    fn ai_turn(&mut self) {
        // Sent by the pending task as its last step.
        self.pending_ai = None;
        if self.battle.status() != BattleStatus::InProgress {
            return;
        }

        let now = self.ctx.clock.now();
        let Some(ai) = self.battle.ai_participant() else {
            return;
        };
        let available = ai.available_skills(now);
        let random = Arc::clone(&self.ctx.random);
        let Some(skill) = choose_ai_skill(&available, &mut |min, max| random.gen_range(min, max))
        else {
            tracing::debug!(battle_id = %self.battle.id(), "AI has no skill off cooldown, skipping turn");
            return;
        };

        if let Err(e) = self.apply(&ParticipantIdentity::Ai, BattleAction::UseSkill(skill)) {
            tracing::warn!(battle_id = %self.battle.id(), error = %e, "AI action rejected");
        }
    }
}
