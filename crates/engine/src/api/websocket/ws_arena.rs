//! Arena entry and exit: `join_arena` and `leave_arena`.

use questarena_domain::{AiDifficulty, BattleMode, UserId};
use questarena_shared::{JoinArenaPayload, MatchmakingStatus, ServerMessage};

use super::{ConnectionContext, WsState};
use crate::api::connections::Binding;
use crate::use_cases::arena::{ArenaError, JoinOutcome};

pub(super) async fn handle_join_arena(
    state: &WsState,
    conn: &mut ConnectionContext,
    user_id: UserId,
    payload: JoinArenaPayload,
) -> Option<ServerMessage> {
    let mode = match payload.mode.parse::<BattleMode>() {
        Ok(mode) => mode,
        Err(e) => return Some(ServerMessage::error(e.to_string())),
    };
    let difficulty = match payload.difficulty.as_deref().map(str::parse::<AiDifficulty>) {
        None => None,
        Some(Ok(difficulty)) => Some(difficulty),
        Some(Err(e)) => return Some(ServerMessage::error(e.to_string())),
    };

    let join = &state.app.use_cases.arena.join;
    let entrant = match join
        .resolve_entrant(user_id.clone(), payload.username, payload.skills)
        .await
    {
        Ok(entrant) => entrant,
        Err(e) => return Some(error_message(&user_id, e)),
    };

    // Bind before entering so the pairing broadcast reaches this socket.
    state.app.connections.bind(
        user_id.clone(),
        Binding {
            connection_id: conn.connection_id,
            sender: conn.sender.clone(),
            display_name: entrant.display_name.clone(),
            loadout: entrant.loadout.clone(),
            close: conn.close.clone(),
        },
    );
    conn.bound_users.insert(user_id.clone());

    tracing::info!(
        connection_id = %conn.connection_id,
        user_id = %user_id,
        mode = %mode,
        "JoinArena message received"
    );

    match join.enter(entrant, mode, difficulty).await {
        // The battle_ready broadcast has already been queued for this socket.
        Ok(JoinOutcome::Matched(_)) => None,
        Ok(JoinOutcome::Searching { queue_position }) => Some(ServerMessage::Matchmaking {
            status: MatchmakingStatus::Searching,
            queue_position,
        }),
        Err(e) => Some(error_message(&user_id, e)),
    }
}

pub(super) async fn handle_leave_arena(
    state: &WsState,
    conn: &mut ConnectionContext,
    user_id: UserId,
) -> Option<ServerMessage> {
    // A binding held by another socket stays with that socket.
    state
        .app
        .connections
        .unbind_connection(&user_id, conn.connection_id);
    conn.bound_users.remove(&user_id);

    let forfeited = state.app.use_cases.arena.leave.execute(&user_id).await;
    tracing::info!(
        connection_id = %conn.connection_id,
        user_id = %user_id,
        forfeited,
        "User left the arena"
    );
    None
}

fn error_message(user_id: &UserId, e: ArenaError) -> ServerMessage {
    tracing::debug!(user_id = %user_id, error = %e, "Join rejected");
    ServerMessage::error(e.to_string())
}
