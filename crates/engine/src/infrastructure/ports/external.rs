//! External collaborator port traits (identity, profiles, history, client delivery).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use questarena_domain::{BattleId, BattleReport, SkillId, UserId};
use questarena_shared::{BattleData, ServerMessage};

use super::error::{AuthError, ProfileStoreError, RepoError};

// =============================================================================
// Identity
// =============================================================================

/// Verifies a session token issued by the identity provider.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    /// The user the token was issued to.
    fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}

// =============================================================================
// Player profiles
// =============================================================================

/// What the profile store knows about a player at join time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub display_name: String,
    pub loadout: Vec<SkillId>,
}

/// Player profile store: supplies profiles, receives battle outcomes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load_profile(&self, user_id: &UserId)
        -> Result<Option<PlayerProfile>, ProfileStoreError>;

    /// Called exactly once per finished battle.
    async fn record_outcome(&self, report: &BattleReport) -> Result<(), ProfileStoreError>;
}

// =============================================================================
// Finished-battle history
// =============================================================================

/// Optional durable log of finished battles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BattleHistory: Send + Sync {
    async fn record(&self, battle: &BattleData) -> Result<(), RepoError>;
    async fn get(&self, battle_id: BattleId) -> Result<Option<BattleData>, RepoError>;
}

// =============================================================================
// Client delivery
// =============================================================================

/// Best-effort delivery of a message to a user's live connection.
#[cfg_attr(test, mockall::automock)]
pub trait ConnectionPort: Send + Sync {
    /// `false` if the user has no binding or the send failed.
    fn send_to_user(&self, user_id: &UserId, message: ServerMessage) -> bool;
}
