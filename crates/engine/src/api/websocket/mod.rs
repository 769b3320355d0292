//! WebSocket handling for arena clients.
//!
//! Every inbound frame is `{type, token?, payload}`. Only `ping` is accepted
//! without a token; every other message is authenticated and the payload's
//! `userId` must match the token's identity.

use std::collections::HashSet;
use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

mod ws_arena;
mod ws_battle;

use questarena_domain::{ConnectionId, UserId};
use questarena_shared::{parse_client_message, ClientMessage, InboundMessage, ServerMessage};

use crate::app::App;
use crate::infrastructure::ports::AuthError;

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// How long the writer gets to flush a close frame on shutdown.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// State for WebSocket handlers.
pub struct WsState {
    pub app: Arc<App>,
}

/// Per-socket state threaded through the message handlers.
pub(crate) struct ConnectionContext {
    pub(crate) connection_id: ConnectionId,
    pub(crate) sender: mpsc::Sender<ServerMessage>,
    /// Cancelled when a newer connection takes over this socket's user
    pub(crate) close: CancellationToken,
    /// Users whose registry binding was created through this socket
    pub(crate) bound_users: HashSet<UserId>,
}

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = ConnectionId::new();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);
    let close = CancellationToken::new();

    let mut conn = ConnectionContext {
        connection_id,
        sender: tx.clone(),
        close: close.clone(),
        bound_users: HashSet::new(),
    };

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    // Forward queued messages to the socket until closed.
    let writer_close = close.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else { break };
                    match serde_json::to_string(&msg) {
                        Ok(json) => {
                            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, message_type = msg.type_name(), "Failed to serialize message");
                        }
                    }
                }
                _ = writer_close.cancelled() => {
                    let _ = ws_sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    loop {
        let result = tokio::select! {
            _ = close.cancelled() => {
                tracing::info!(connection_id = %connection_id, "Connection superseded, closing");
                break;
            }
            next = ws_receiver.next() => match next {
                Some(result) => result,
                None => break,
            },
        };

        match result {
            Ok(Message::Text(text)) => {
                if let Some(response) = handle_text(text.as_str(), &state, &mut conn).await {
                    if tx.try_send(response).is_err() {
                        tracing::warn!(
                            connection_id = %connection_id,
                            "Failed to send response, channel full or closed"
                        );
                    }
                }
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    disconnect(&state, &conn).await;

    close.cancel();
    if tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, &mut send_task)
        .await
        .is_err()
    {
        send_task.abort();
    }

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Release this socket's bindings. A user who is still bound to this socket
/// has left without `leave_arena`, which forfeits their running battles.
async fn disconnect(state: &WsState, conn: &ConnectionContext) {
    for user_id in &conn.bound_users {
        if state
            .app
            .connections
            .unbind_connection(user_id, conn.connection_id)
        {
            let forfeited = state.app.use_cases.arena.leave.execute(user_id).await;
            tracing::info!(
                connection_id = %conn.connection_id,
                user_id = %user_id,
                forfeited,
                "Disconnected user released"
            );
        }
    }
}

/// Parse, authenticate and dispatch one text frame.
async fn handle_text(
    text: &str,
    state: &WsState,
    conn: &mut ConnectionContext,
) -> Option<ServerMessage> {
    let InboundMessage { token, message } = match parse_client_message(text) {
        Ok(inbound) => inbound,
        Err(e) => {
            tracing::warn!(connection_id = %conn.connection_id, error = %e, "Failed to parse message");
            return Some(ServerMessage::error(e.to_string()));
        }
    };

    if !message.requires_token() {
        return handle_message(message, None, state, conn).await;
    }

    match authenticate(&state.app, token.as_deref(), message.claimed_user_id()) {
        Ok(user_id) => handle_message(message, Some(user_id), state, conn).await,
        Err(e) => {
            tracing::debug!(
                connection_id = %conn.connection_id,
                message_type = message.type_name(),
                error = %e,
                "Rejected unauthenticated message"
            );
            Some(ServerMessage::error(e.to_string()))
        }
    }
}

/// Verify `token` and check it matches the identity the payload claims.
fn authenticate(
    app: &App,
    token: Option<&str>,
    claimed_user_id: Option<&str>,
) -> Result<UserId, AuthError> {
    let user_id = app.tokens.verify(token.ok_or(AuthError::MissingToken)?)?;
    match claimed_user_id {
        Some(claimed) if claimed != user_id.as_str() => Err(AuthError::IdentityMismatch),
        _ => Ok(user_id),
    }
}

/// Dispatch a parsed client message to the appropriate handler.
async fn handle_message(
    msg: ClientMessage,
    user_id: Option<UserId>,
    state: &WsState,
    conn: &mut ConnectionContext,
) -> Option<ServerMessage> {
    let Some(user_id) = user_id else {
        return match msg {
            ClientMessage::Ping => Some(ServerMessage::Pong),
            _ => Some(ServerMessage::error(AuthError::MissingToken.to_string())),
        };
    };

    match msg {
        ClientMessage::Ping => Some(ServerMessage::Pong),
        ClientMessage::JoinArena(payload) => {
            ws_arena::handle_join_arena(state, conn, user_id, payload).await
        }
        ClientMessage::LeaveArena(_) => ws_arena::handle_leave_arena(state, conn, user_id).await,
        ClientMessage::BattleReady(payload) => {
            ws_battle::handle_battle_ready(state, conn, user_id, payload).await
        }
        ClientMessage::BattleAction(payload) => {
            ws_battle::handle_battle_action(state, conn, user_id, payload).await
        }
        ClientMessage::GetBattleState(payload) => ws_battle::handle_get_battle_state(state, payload),
        ClientMessage::ChatMessage(payload) => {
            ws_battle::handle_chat_message(state, user_id, payload)
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support;
