//! Engine configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Secret used when `ARENA_TOKEN_SECRET` is unset. Development only.
pub const DEV_TOKEN_SECRET: &str = "questarena-dev-secret";

/// Runtime configuration for the arena engine.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub server_host: String,
    pub server_port: u16,
    /// Shared secret for verifying session tokens
    pub token_secret: String,
    /// How often the reaper sweeps the battle store
    pub reaper_interval: Duration,
    /// Battles older than this (by creation time) are removed regardless of status
    pub stale_after: Duration,
    /// Finished battles are kept this long after ending
    pub finished_grace: Duration,
    pub ai_delay_min_ms: u64,
    pub ai_delay_max_ms: u64,
    pub player_max_health: i32,
    /// PvP battles wait for both players to send `battle_ready`
    pub pvp_ready_handshake: bool,
    pub skill_catalog_path: Option<PathBuf>,
    pub profile_store_url: Option<String>,
    pub battle_history_db: Option<String>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            token_secret: DEV_TOKEN_SECRET.to_string(),
            reaper_interval: Duration::from_secs(5 * 60),
            stale_after: Duration::from_secs(60 * 60),
            finished_grace: Duration::from_secs(5 * 60),
            ai_delay_min_ms: 1000,
            ai_delay_max_ms: 3000,
            player_max_health: 100,
            pvp_ready_handshake: false,
            skill_catalog_path: None,
            profile_store_url: None,
            battle_history_db: None,
        }
    }
}

impl ArenaConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let parse_or = |key: &str, default: u64| -> u64 {
            match get(key) {
                Some(raw) => raw.parse().unwrap_or_else(|_| {
                    tracing::warn!(key, value = %raw, default, "Invalid numeric setting, using default");
                    default
                }),
                None => default,
            }
        };

        let server_port = get("SERVER_PORT")
            .or_else(|| get("PORT"))
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.server_port);

        let ai_delay_min_ms = parse_or("ARENA_AI_DELAY_MIN_MS", defaults.ai_delay_min_ms);
        let ai_delay_max_ms =
            parse_or("ARENA_AI_DELAY_MAX_MS", defaults.ai_delay_max_ms).max(ai_delay_min_ms);

        let player_max_health = get("ARENA_PLAYER_MAX_HEALTH")
            .and_then(|v| v.parse::<i32>().ok())
            .filter(|hp| *hp > 0)
            .unwrap_or(defaults.player_max_health);

        let pvp_ready_handshake = get("ARENA_PVP_READY_HANDSHAKE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(defaults.pvp_ready_handshake);

        Self {
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            token_secret: get("ARENA_TOKEN_SECRET").unwrap_or(defaults.token_secret),
            reaper_interval: Duration::from_secs(parse_or(
                "ARENA_REAPER_INTERVAL_SECS",
                defaults.reaper_interval.as_secs(),
            )),
            stale_after: Duration::from_secs(parse_or(
                "ARENA_STALE_AFTER_SECS",
                defaults.stale_after.as_secs(),
            )),
            finished_grace: Duration::from_secs(parse_or(
                "ARENA_FINISHED_GRACE_SECS",
                defaults.finished_grace.as_secs(),
            )),
            ai_delay_min_ms,
            ai_delay_max_ms,
            player_max_health,
            pvp_ready_handshake,
            skill_catalog_path: get("SKILL_CATALOG_PATH").map(PathBuf::from),
            profile_store_url: get("PROFILE_STORE_URL"),
            battle_history_db: get("BATTLE_HISTORY_DB"),
        }
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.token_secret == DEV_TOKEN_SECRET
    }
}
