//! Player profile store adapters.
//!
//! `InMemoryProfileStore` keeps profiles and running totals in process;
//! `HttpProfileStore` talks to an external profile service.

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use questarena_domain::{BattleReport, ParticipantIdentity, UserId};

use crate::infrastructure::ports::{PlayerProfile, ProfileStore, ProfileStoreError};

// =============================================================================
// In-memory
// =============================================================================

/// Running totals for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRecord {
    pub xp: u64,
    pub wins: u32,
    pub losses: u32,
}

/// Process-local profile store. Profiles are seeded up front; outcomes
/// accumulate XP and win/loss counts.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<UserId, PlayerProfile>,
    records: DashMap<UserId, PlayerRecord>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, user_id: UserId, profile: PlayerProfile) -> Self {
        self.profiles.insert(user_id, profile);
        self
    }

    pub fn record(&self, user_id: &UserId) -> PlayerRecord {
        self.records
            .get(user_id)
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn xp(&self, user_id: &UserId) -> u64 {
        self.record(user_id).xp
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<PlayerProfile>, ProfileStoreError> {
        Ok(self.profiles.get(user_id).map(|p| p.clone()))
    }

    async fn record_outcome(&self, report: &BattleReport) -> Result<(), ProfileStoreError> {
        for award in &report.xp_awarded {
            let mut record = self.records.entry(award.user_id.clone()).or_default();
            record.xp += u64::from(award.xp);
            if let ParticipantIdentity::Human(winner) = &report.winner {
                if winner == &award.user_id {
                    record.wins += 1;
                } else {
                    record.losses += 1;
                }
            } else {
                record.losses += 1;
            }
        }
        Ok(())
    }
}

// =============================================================================
// HTTP
// =============================================================================

/// Client for an external profile service.
///
/// - `GET {base}/profiles/{userId}` returns a `PlayerProfile` or 404
/// - `POST {base}/battle-outcomes` accepts a `BattleReport`
#[derive(Clone)]
pub struct HttpProfileStore {
    client: Client,
    base_url: String,
}

impl HttpProfileStore {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, 10)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn load_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Option<PlayerProfile>, ProfileStoreError> {
        let response = self
            .client
            .get(format!("{}/profiles/{}", self.base_url, user_id))
            .send()
            .await
            .map_err(|e| ProfileStoreError::RequestFailed(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ProfileStoreError::RequestFailed(format!(
                "GET profile returned {}",
                response.status()
            )));
        }

        let profile = response
            .json()
            .await
            .map_err(|e| ProfileStoreError::InvalidResponse(e.to_string()))?;
        Ok(Some(profile))
    }

    async fn record_outcome(&self, report: &BattleReport) -> Result<(), ProfileStoreError> {
        let response = self
            .client
            .post(format!("{}/battle-outcomes", self.base_url))
            .json(report)
            .send()
            .await
            .map_err(|e| ProfileStoreError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| ProfileStoreError::RequestFailed(e.to_string()))?;
            return Err(ProfileStoreError::RequestFailed(error_text));
        }
        Ok(())
    }
}
