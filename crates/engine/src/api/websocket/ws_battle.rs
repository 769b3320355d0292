//! In-battle messages: readiness, actions, snapshots and chat.

use uuid::Uuid;

use questarena_domain::{BattleId, UserId};
use questarena_shared::{
    BattleActionPayload, BattleData, BattleReadyPayload, ChatMessagePayload,
    GetBattleStatePayload, ServerMessage,
};

use super::{ConnectionContext, WsState};
use crate::use_cases::arena::ArenaError;

fn parse_battle_id(raw: &str) -> Result<BattleId, ArenaError> {
    Uuid::parse_str(raw)
        .map(BattleId::from_uuid)
        .map_err(|_| ArenaError::BattleNotFound)
}

/// Successful results reach a bound socket through the broadcast; a socket
/// acting for a user bound elsewhere gets the snapshot directly.
fn reply_unless_broadcast(
    state: &WsState,
    conn: &ConnectionContext,
    user_id: &UserId,
    result: Result<BattleData, ArenaError>,
) -> Option<ServerMessage> {
    match result {
        Ok(battle) => {
            if state.app.connections.is_bound_to(user_id, conn.connection_id) {
                None
            } else {
                Some(ServerMessage::battle_update(battle))
            }
        }
        Err(e) => {
            tracing::debug!(
                connection_id = %conn.connection_id,
                user_id = %user_id,
                error = %e,
                "Battle request rejected"
            );
            Some(ServerMessage::error(e.to_string()))
        }
    }
}

pub(super) async fn handle_battle_ready(
    state: &WsState,
    conn: &ConnectionContext,
    user_id: UserId,
    payload: BattleReadyPayload,
) -> Option<ServerMessage> {
    let result = match parse_battle_id(&payload.battle_id) {
        Ok(battle_id) => {
            state
                .app
                .use_cases
                .arena
                .battle
                .acknowledge_ready(battle_id, user_id.clone())
                .await
        }
        Err(e) => Err(e),
    };
    reply_unless_broadcast(state, conn, &user_id, result)
}

pub(super) async fn handle_battle_action(
    state: &WsState,
    conn: &ConnectionContext,
    user_id: UserId,
    payload: BattleActionPayload,
) -> Option<ServerMessage> {
    let action = match payload.to_battle_action() {
        Ok(action) => action,
        Err(e) => return Some(ServerMessage::error(e.to_string())),
    };

    let result = match parse_battle_id(&payload.battle_id) {
        Ok(battle_id) => {
            state
                .app
                .use_cases
                .arena
                .battle
                .submit(battle_id, user_id.clone(), action)
                .await
        }
        Err(e) => Err(e),
    };
    reply_unless_broadcast(state, conn, &user_id, result)
}

pub(super) fn handle_get_battle_state(
    state: &WsState,
    payload: GetBattleStatePayload,
) -> Option<ServerMessage> {
    let snapshot = parse_battle_id(&payload.battle_id)
        .and_then(|battle_id| state.app.use_cases.arena.battle.snapshot(battle_id));
    Some(match snapshot {
        Ok(battle) => ServerMessage::battle_update(battle),
        Err(e) => ServerMessage::error(e.to_string()),
    })
}

pub(super) fn handle_chat_message(
    state: &WsState,
    user_id: UserId,
    payload: ChatMessagePayload,
) -> Option<ServerMessage> {
    let ChatMessagePayload {
        battle_id,
        username,
        message,
        ..
    } = payload;

    let delivered = parse_battle_id(&battle_id).and_then(|battle_id| {
        state
            .app
            .use_cases
            .arena
            .battle
            .chat(battle_id, &user_id, username, message)
    });
    match delivered {
        Ok(delivered) => {
            tracing::debug!(user_id = %user_id, delivered, "Chat relayed");
            None
        }
        Err(e) => Some(ServerMessage::error(e.to_string())),
    }
}
