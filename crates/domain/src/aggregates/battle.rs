//! Battle aggregate - one matched pair of participants and their combat log
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: participants, rounds and status only change through methods
//! - **Outcome enums**: mutations return `ActionOutcome` / `ReadyOutcome`
//! - **Injected time and randomness**: every mutation takes `now`, and skill
//!   resolution takes a `roll(min, max)` closure

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::combat;
use crate::entities::{Participant, ParticipantIdentity, SkillCatalog};
use crate::error::BattleError;
use crate::events::{ActionOutcome, BattleResult, ReadyOutcome};
use crate::value_objects::{AiDifficulty, BattleMode};
use crate::{BattleId, SkillId, UserId};

/// Lifecycle of a battle. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    /// PvP: matched, waiting for both sides to acknowledge
    Waiting,
    /// PvP: both sides acknowledged
    Ready,
    InProgress,
    Finished,
}

impl BattleStatus {
    /// The only status this one may move to.
    pub fn successor(self) -> Option<BattleStatus> {
        match self {
            BattleStatus::Waiting => Some(BattleStatus::Ready),
            BattleStatus::Ready => Some(BattleStatus::InProgress),
            BattleStatus::InProgress => Some(BattleStatus::Finished),
            BattleStatus::Finished => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == BattleStatus::Finished
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BattleStatus::Waiting => "waiting",
            BattleStatus::Ready => "ready",
            BattleStatus::InProgress => "in_progress",
            BattleStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for BattleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action a participant submits on their turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleAction {
    UseSkill(SkillId),
    Forfeit,
}

/// What a round's actor did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "skillId", rename_all = "snake_case")]
pub enum RoundAction {
    Skill(SkillId),
    Forfeit,
}

impl RoundAction {
    pub fn skill_id(&self) -> Option<&SkillId> {
        match self {
            RoundAction::Skill(skill_id) => Some(skill_id),
            RoundAction::Forfeit => None,
        }
    }
}

/// Numeric and narrative result of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    pub damage: i32,
    pub healing: i32,
    pub narrative_text: String,
}

/// One applied action. Rounds are never mutated or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub actor: ParticipantIdentity,
    pub action: RoundAction,
    pub outcome: RoundOutcome,
    pub occurred_at: DateTime<Utc>,
}

/// A battle between exactly two participants.
///
/// # Invariants
///
/// - exactly two participants with distinct identities, at most one AI
/// - `status` only moves forward, one step at a time
/// - `winner` and `ended_at` are set iff `status == Finished`
/// - `rounds` is append-only
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use questarena_domain::{
///     AiDifficulty, Battle, BattleAction, BattleId, BattleStatus, Loadout, Participant,
///     SkillCatalog, SkillId, UserId,
/// };
///
/// let catalog = SkillCatalog::standard();
/// let skills = ["fireball", "heal", "shield", "ice_shard"].map(SkillId::new).to_vec();
/// let loadout = Loadout::new(skills, &catalog).unwrap();
/// let hero = Participant::human(UserId::new("hero"), "Hero", loadout.clone(), 100);
/// let ai = Participant::ai(AiDifficulty::Easy, loadout);
/// let now = Utc::now();
///
/// let mut battle = Battle::pve(BattleId::new(), hero, ai, now).unwrap();
/// assert_eq!(battle.status(), BattleStatus::InProgress);
///
/// let outcome = battle
///     .submit_action(
///         &UserId::new("hero").into(),
///         BattleAction::UseSkill(SkillId::new("fireball")),
///         &catalog,
///         now,
///         &mut |min, _| min,
///     )
///     .unwrap();
/// assert_eq!(outcome.round().outcome.damage, 35);
/// ```
#[derive(Debug, Clone)]
pub struct Battle {
    id: BattleId,
    mode: BattleMode,
    participants: [Participant; 2],
    rounds: Vec<Round>,
    status: BattleStatus,
    winner: Option<ParticipantIdentity>,
    ready: [bool; 2],
    created_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl Battle {
    /// A human against a synthesized AI. Starts `InProgress`.
    pub fn pve(
        id: BattleId,
        human: Participant,
        ai: Participant,
        now: DateTime<Utc>,
    ) -> Result<Self, BattleError> {
        if human.is_ai() || !ai.is_ai() {
            return Err(BattleError::validation(
                "a PvE battle needs one human and one AI participant",
            ));
        }
        Ok(Self {
            id,
            mode: BattleMode::Pve,
            participants: [human, ai],
            rounds: Vec::new(),
            status: BattleStatus::InProgress,
            winner: None,
            ready: [true, true],
            created_at: now,
            ended_at: None,
        })
    }

    /// Two humans. Starts `Waiting` until both acknowledge readiness.
    pub fn pvp(
        id: BattleId,
        first: Participant,
        second: Participant,
        now: DateTime<Utc>,
    ) -> Result<Self, BattleError> {
        if first.is_ai() || second.is_ai() {
            return Err(BattleError::validation(
                "a PvP battle needs two human participants",
            ));
        }
        if first.identity() == second.identity() {
            return Err(BattleError::validation(
                "a participant cannot battle themselves",
            ));
        }
        Ok(Self {
            id,
            mode: BattleMode::Pvp,
            participants: [first, second],
            rounds: Vec::new(),
            status: BattleStatus::Waiting,
            winner: None,
            ready: [false, false],
            created_at: now,
            ended_at: None,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> BattleId {
        self.id
    }

    pub fn mode(&self) -> BattleMode {
        self.mode
    }

    pub fn participants(&self) -> &[Participant; 2] {
        &self.participants
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn status(&self) -> BattleStatus {
        self.status
    }

    pub fn winner(&self) -> Option<&ParticipantIdentity> {
        self.winner.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn is_ready(&self, identity: &ParticipantIdentity) -> bool {
        self.index_of(identity).is_some_and(|i| self.ready[i])
    }

    pub fn participant(&self, identity: &ParticipantIdentity) -> Option<&Participant> {
        self.index_of(identity).map(|i| &self.participants[i])
    }

    pub fn opponent_of(&self, identity: &ParticipantIdentity) -> Option<&Participant> {
        self.index_of(identity).map(|i| &self.participants[1 - i])
    }

    pub fn involves(&self, user_id: &UserId) -> bool {
        self.participants
            .iter()
            .any(|p| p.identity().user_id() == Some(user_id))
    }

    pub fn ai_participant(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_ai())
    }

    pub fn ai_difficulty(&self) -> Option<AiDifficulty> {
        self.ai_participant().and_then(Participant::ai_difficulty)
    }

    /// Final result, once the battle is finished.
    pub fn result(&self) -> Option<BattleResult> {
        let winner = self.winner.clone()?;
        let loser = self.opponent_of(&winner)?.identity().clone();
        let forfeited = self
            .rounds
            .last()
            .is_some_and(|round| round.action == RoundAction::Forfeit);
        Some(BattleResult {
            winner,
            loser,
            forfeited,
        })
    }

    fn index_of(&self, identity: &ParticipantIdentity) -> Option<usize> {
        self.participants
            .iter()
            .position(|p| p.identity() == identity)
    }

    // =========================================================================
    // State machine
    // =========================================================================

    fn advance(&mut self, to: BattleStatus) -> Result<(), BattleError> {
        if self.status.successor() != Some(to) {
            return Err(BattleError::InvalidStateTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Record that `identity` is ready to fight. Only valid while `Waiting`.
    pub fn acknowledge_ready(
        &mut self,
        identity: &ParticipantIdentity,
    ) -> Result<ReadyOutcome, BattleError> {
        let index = self.index_of(identity).ok_or(BattleError::NotParticipant)?;
        if self.status != BattleStatus::Waiting {
            return Err(BattleError::SessionNotActive {
                status: self.status,
            });
        }
        if self.ready[index] {
            return Ok(ReadyOutcome::AlreadyAcknowledged);
        }

        self.ready[index] = true;
        if self.ready.iter().all(|ready| *ready) {
            self.advance(BattleStatus::Ready)?;
            Ok(ReadyOutcome::AllReady)
        } else {
            Ok(ReadyOutcome::Acknowledged {
                waiting_for: self.participants[1 - index].identity().clone(),
            })
        }
    }

    /// `Ready -> InProgress`.
    pub fn start(&mut self) -> Result<(), BattleError> {
        self.advance(BattleStatus::InProgress)
    }

    /// Apply one action from `identity`.
    ///
    /// Rejected actions leave the battle untouched.
    pub fn submit_action<R>(
        &mut self,
        identity: &ParticipantIdentity,
        action: BattleAction,
        catalog: &SkillCatalog,
        now: DateTime<Utc>,
        roll: &mut R,
    ) -> Result<ActionOutcome, BattleError>
    where
        R: FnMut(i32, i32) -> i32,
    {
        let actor = self.index_of(identity).ok_or(BattleError::NotParticipant)?;
        if self.status != BattleStatus::InProgress {
            return Err(BattleError::SessionNotActive {
                status: self.status,
            });
        }
        let target = 1 - actor;

        match action {
            BattleAction::Forfeit => {
                let round = Round {
                    actor: identity.clone(),
                    action: RoundAction::Forfeit,
                    outcome: RoundOutcome {
                        damage: 0,
                        healing: 0,
                        narrative_text: format!(
                            "{} forfeited the battle!",
                            self.participants[actor].display_name()
                        ),
                    },
                    occurred_at: now,
                };
                self.rounds.push(round.clone());
                let result = self.finish(target, now)?;
                Ok(ActionOutcome::Finished { round, result })
            }
            BattleAction::UseSkill(skill_id) => {
                let skill = catalog
                    .get(&skill_id)
                    .ok_or_else(|| BattleError::UnknownSkill(skill_id.clone()))?;
                let user = &self.participants[actor];
                if !user.loadout().contains(&skill_id) {
                    return Err(BattleError::SkillNotInLoadout(skill_id));
                }
                if let Some(remaining) = user.cooldown_remaining(&skill_id, now) {
                    let millis = remaining.num_milliseconds().max(0);
                    return Err(BattleError::SkillOnCooldown {
                        skill_id,
                        remaining_seconds: (millis + 999) / 1000,
                    });
                }

                let effect = combat::resolve(
                    catalog,
                    &skill_id,
                    &self.participants[actor],
                    &self.participants[target],
                    roll,
                )?;

                self.participants[target].take_damage(effect.damage_dealt);
                self.participants[actor].heal(effect.healing_applied);
                self.participants[actor].start_cooldown(skill, now);

                let round = Round {
                    actor: identity.clone(),
                    action: RoundAction::Skill(skill_id),
                    outcome: RoundOutcome {
                        damage: effect.damage_dealt,
                        healing: effect.healing_applied,
                        narrative_text: effect.effect_text,
                    },
                    occurred_at: now,
                };
                self.rounds.push(round.clone());

                if self.participants[target].is_defeated() {
                    let result = self.finish(actor, now)?;
                    Ok(ActionOutcome::Finished { round, result })
                } else {
                    Ok(ActionOutcome::Continued { round })
                }
            }
        }
    }

    fn finish(&mut self, winner: usize, now: DateTime<Utc>) -> Result<BattleResult, BattleError> {
        self.advance(BattleStatus::Finished)?;
        self.winner = Some(self.participants[winner].identity().clone());
        self.ended_at = Some(now);
        self.result()
            .ok_or_else(|| BattleError::validation("finished battle has no winner"))
    }
}
