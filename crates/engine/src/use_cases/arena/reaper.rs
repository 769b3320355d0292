//! Periodic removal of stale and long-finished battles.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::infrastructure::ports::ClockPort;
use crate::stores::BattleStore;

pub struct SessionReaper {
    battles: Arc<BattleStore>,
    clock: Arc<dyn ClockPort>,
    /// Removed regardless of status once this old
    stale_after: Duration,
    /// Finished battles are kept this long for late snapshot reads
    finished_grace: Duration,
}

impl SessionReaper {
    pub fn new(
        battles: Arc<BattleStore>,
        clock: Arc<dyn ClockPort>,
        stale_after: Duration,
        finished_grace: Duration,
    ) -> Self {
        Self {
            battles,
            clock,
            stale_after,
            finished_grace,
        }
    }

    /// One pass over the store. Returns the number of battles removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;

        for handle in self.battles.handles() {
            let stale = elapsed(now, handle.created_at()) > self.stale_after;
            let expired = handle.status().is_terminal()
                && handle
                    .ended_at()
                    .is_some_and(|ended| elapsed(now, ended) > self.finished_grace);

            if (stale || expired) && self.battles.remove(handle.id()).is_some() {
                removed += 1;
                tracing::debug!(
                    battle_id = %handle.id(),
                    status = %handle.status(),
                    stale,
                    "Reaped battle"
                );
            }
        }

        if removed > 0 {
            tracing::info!(removed, remaining = self.battles.len(), "Battle sweep complete");
        }
        removed
    }

    /// Run `sweep` every `interval` until the runtime shuts down.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let interval = interval.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.sweep();
            }
        })
    }
}

fn elapsed(now: DateTime<Utc>, since: DateTime<Utc>) -> Duration {
    (now - since).to_std().unwrap_or_default()
}
