//! SQLite-backed log of finished battles.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use questarena_domain::BattleId;
use questarena_shared::BattleData;

use crate::infrastructure::ports::{BattleHistory, ClockPort, RepoError};

/// Stores the final snapshot of every finished battle, keyed by battle id.
pub struct SqliteBattleHistory {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteBattleHistory {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("battle_history", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS battle_history (
                battle_id TEXT PRIMARY KEY NOT NULL,
                mode TEXT NOT NULL,
                winner TEXT,
                ended_at TEXT,
                snapshot_json TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("battle_history", e))?;

        Ok(Self { pool, clock })
    }

    /// Number of recorded battles.
    pub async fn count(&self) -> Result<i64, RepoError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM battle_history")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("battle_history", e))?;
        Ok(row.get("n"))
    }
}

#[async_trait]
impl BattleHistory for SqliteBattleHistory {
    async fn record(&self, battle: &BattleData) -> Result<(), RepoError> {
        let json = serde_json::to_string(battle).map_err(RepoError::serialization)?;

        // A battle finishes once; a repeated record keeps the first snapshot.
        sqlx::query(
            r#"
            INSERT INTO battle_history (battle_id, mode, winner, ended_at, snapshot_json, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(battle_id) DO NOTHING
            "#,
        )
        .bind(battle.id.to_string())
        .bind(battle.mode.to_string())
        .bind(battle.winner.clone())
        .bind(battle.ended_at.map(|t| t.to_rfc3339()))
        .bind(json)
        .bind(self.clock.now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("battle_history", e))?;

        Ok(())
    }

    async fn get(&self, battle_id: BattleId) -> Result<Option<BattleData>, RepoError> {
        let row = sqlx::query("SELECT snapshot_json FROM battle_history WHERE battle_id = ?")
            .bind(battle_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("battle_history", e))?;

        match row {
            Some(row) => {
                let json: String = row.get("snapshot_json");
                let battle = serde_json::from_str(&json).map_err(RepoError::serialization)?;
                Ok(Some(battle))
            }
            None => Ok(None),
        }
    }
}
