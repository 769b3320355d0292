//! FIFO queue of players waiting for a PvP opponent.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};

use questarena_domain::{Loadout, UserId};

/// A player waiting for an opponent.
#[derive(Debug, Clone)]
pub struct MatchmakingEntry {
    pub user_id: UserId,
    pub display_name: String,
    pub loadout: Loadout,
    pub queued_at: DateTime<Utc>,
}

#[derive(Debug)]
pub enum QueueOutcome {
    /// The earliest compatible entry, already removed from the queue.
    Paired(MatchmakingEntry),
    /// No opponent yet. Position is 1-based.
    Queued { position: usize },
}

#[derive(Default)]
pub struct MatchmakingQueue {
    entries: Mutex<VecDeque<MatchmakingEntry>>,
}

/// Exclusive access to the queue.
///
/// Held by a pairing join until its battle is in the store, and by a leave
/// until it has looked for the user's running battles.
pub struct QueueGuard<'a> {
    entries: MutexGuard<'a, VecDeque<MatchmakingEntry>>,
}

impl QueueGuard<'_> {
    /// Pop the earliest entry from a different user, or enqueue `entry`.
    ///
    /// A user who is already queued keeps their original position.
    pub fn pair_or_enqueue(&mut self, entry: MatchmakingEntry) -> QueueOutcome {
        let entries = &mut *self.entries;

        if let Some(index) = entries.iter().position(|e| e.user_id != entry.user_id) {
            if let Some(opponent) = entries.remove(index) {
                // The caller is matched now; drop any stale entry of theirs.
                entries.retain(|e| e.user_id != entry.user_id);
                return QueueOutcome::Paired(opponent);
            }
        }

        if let Some(index) = entries.iter().position(|e| e.user_id == entry.user_id) {
            return QueueOutcome::Queued { position: index + 1 };
        }

        entries.push_back(entry);
        QueueOutcome::Queued {
            position: entries.len(),
        }
    }

    /// Remove `user_id`'s entry. Returns whether one was queued.
    pub fn remove(&mut self, user_id: &UserId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.user_id != user_id);
        self.entries.len() != before
    }
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> QueueGuard<'_> {
        QueueGuard {
            entries: self.entries.lock().await,
        }
    }

    #[cfg(test)]
    pub async fn position(&self, user_id: &UserId) -> Option<usize> {
        self.entries
            .lock()
            .await
            .iter()
            .position(|e| &e.user_id == user_id)
            .map(|index| index + 1)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
