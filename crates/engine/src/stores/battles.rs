//! Live battle registry.

use dashmap::DashMap;

use questarena_domain::{BattleId, BattleStatus, UserId};

use crate::use_cases::arena::BattleHandle;

/// Handles of every live battle actor, keyed by battle id.
///
/// Removing a handle drops the store's sender; the actor stops once no other
/// clone is in flight.
#[derive(Default)]
pub struct BattleStore {
    battles: DashMap<BattleId, BattleHandle>,
}

impl BattleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, handle: BattleHandle) {
        self.battles.insert(handle.id(), handle);
    }

    pub fn get(&self, id: BattleId) -> Option<BattleHandle> {
        self.battles.get(&id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: BattleId) -> Option<BattleHandle> {
        self.battles.remove(&id).map(|(_, handle)| handle)
    }

    /// Snapshot of all handles; the map is not locked while callers use them.
    pub fn handles(&self) -> Vec<BattleHandle> {
        self.battles
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Battles `user_id` is currently fighting.
    pub fn in_progress_for(&self, user_id: &UserId) -> Vec<BattleHandle> {
        self.battles
            .iter()
            .filter(|entry| {
                entry.involves(user_id) && entry.status() == BattleStatus::InProgress
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.battles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.battles.is_empty()
    }
}
