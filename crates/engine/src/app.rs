//! Application state and composition.

use std::sync::Arc;

use questarena_domain::SkillCatalog;

use crate::api::connections::ConnectionRegistry;
use crate::infrastructure::config::ArenaConfig;
use crate::infrastructure::ports::{
    BattleHistory, ClockPort, ProfileStore, RandomPort, TokenVerifier,
};
use crate::stores::BattleStore;
use crate::use_cases::arena::{
    ArenaUseCases, BattleActions, BattleContext, BroadcastDispatcher, JoinArena, JoinSettings,
    LeaveArena, MatchmakingQueue, OutcomeRecorder, SessionReaper,
};

/// Main application state.
///
/// Holds shared stores, ports and use cases.
/// Passed to HTTP/WebSocket handlers via Axum state.
pub struct App {
    pub config: ArenaConfig,
    pub catalog: Arc<SkillCatalog>,
    pub clock: Arc<dyn ClockPort>,
    pub tokens: Arc<dyn TokenVerifier>,
    pub connections: Arc<ConnectionRegistry>,
    pub battles: Arc<BattleStore>,
    pub history: Option<Arc<dyn BattleHistory>>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub arena: ArenaUseCases,
}

/// External collaborators the application is wired with.
pub struct Ports {
    pub clock: Arc<dyn ClockPort>,
    pub random: Arc<dyn RandomPort>,
    pub tokens: Arc<dyn TokenVerifier>,
    pub profiles: Arc<dyn ProfileStore>,
    pub history: Option<Arc<dyn BattleHistory>>,
}

impl App {
    pub fn new(config: ArenaConfig, catalog: SkillCatalog, ports: Ports) -> Self {
        let Ports {
            clock,
            random,
            tokens,
            profiles,
            history,
        } = ports;

        let catalog = Arc::new(catalog);
        let connections = Arc::new(ConnectionRegistry::new());
        let battles = Arc::new(BattleStore::new());
        let queue = Arc::new(MatchmakingQueue::new());
        let broadcast = Arc::new(BroadcastDispatcher::new(connections.clone()));

        let battle_ctx = BattleContext {
            catalog: catalog.clone(),
            clock: clock.clone(),
            random,
            broadcast: broadcast.clone(),
            outcomes: OutcomeRecorder::new(profiles.clone(), history.clone()),
            ai_delay_min_ms: config.ai_delay_min_ms,
            ai_delay_max_ms: config.ai_delay_max_ms,
        };

        let join = Arc::new(JoinArena::new(
            profiles,
            queue.clone(),
            battles.clone(),
            battle_ctx,
            JoinSettings {
                player_max_health: config.player_max_health,
                pvp_ready_handshake: config.pvp_ready_handshake,
            },
        ));
        let battle = Arc::new(BattleActions::new(
            battles.clone(),
            broadcast,
            clock.clone(),
        ));
        let leave = Arc::new(LeaveArena::new(queue, battles.clone()));
        let reaper = Arc::new(SessionReaper::new(
            battles.clone(),
            clock.clone(),
            config.stale_after,
            config.finished_grace,
        ));

        let use_cases = UseCases {
            arena: ArenaUseCases::new(join, battle, leave, reaper),
        };

        Self {
            config,
            catalog,
            clock,
            tokens,
            connections,
            battles,
            history,
            use_cases,
        }
    }
}
