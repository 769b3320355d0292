//! Reports finished battles to the profile store and the history log.

use std::sync::Arc;

use questarena_domain::{Battle, BattleReport};
use questarena_shared::BattleData;

use crate::infrastructure::ports::{BattleHistory, ProfileStore};

/// Observer of `Finished` transitions.
#[derive(Clone)]
pub struct OutcomeRecorder {
    profiles: Arc<dyn ProfileStore>,
    history: Option<Arc<dyn BattleHistory>>,
}

impl OutcomeRecorder {
    pub fn new(profiles: Arc<dyn ProfileStore>, history: Option<Arc<dyn BattleHistory>>) -> Self {
        Self { profiles, history }
    }

    /// Report in a background task so the battle actor never waits on I/O.
    pub fn record(&self, battle: &Battle) {
        let Some(report) = BattleReport::from_battle(battle) else {
            tracing::warn!(battle_id = %battle.id(), "Outcome requested for unfinished battle");
            return;
        };
        let snapshot = BattleData::from(battle);
        let this = self.clone();
        tokio::spawn(async move {
            this.deliver(report, snapshot).await;
        });
    }

    /// Report and wait for both sinks.
    #[cfg(test)]
    pub async fn record_now(&self, battle: &Battle) {
        if let Some(report) = BattleReport::from_battle(battle) {
            self.deliver(report, BattleData::from(battle)).await;
        }
    }

    async fn deliver(&self, report: BattleReport, snapshot: BattleData) {
        match self.profiles.record_outcome(&report).await {
            Ok(()) => tracing::info!(
                battle_id = %report.battle_id,
                winner = %report.winner,
                loser = %report.loser,
                forfeited = report.forfeited,
                "Battle outcome recorded"
            ),
            Err(e) => tracing::warn!(
                battle_id = %report.battle_id,
                error = %e,
                "Failed to report battle outcome"
            ),
        }

        if let Some(history) = &self.history {
            if let Err(e) = history.record(&snapshot).await {
                tracing::warn!(
                    battle_id = %report.battle_id,
                    error = %e,
                    "Failed to archive finished battle"
                );
            }
        }
    }
}
