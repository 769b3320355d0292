//! WebSocket message types for the arena protocol
//!
//! Inbound frames are `{"type": ..., "token": ..., "payload": {...}}`. They are
//! parsed in two steps (envelope, then the payload for that type) so an unknown
//! type and a malformed payload produce different errors.
//!
//! Outbound frames are `ServerMessage`, internally tagged by `type`.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::requests::{
    BattleActionPayload, BattleReadyPayload, ChatMessagePayload, GetBattleStatePayload,
    JoinArenaPayload, LeaveArenaPayload,
};
use crate::responses::BattleData;

// =============================================================================
// Errors
// =============================================================================

/// Protocol-level rejection of an inbound frame
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid message format")]
    MalformedJson,
    #[error("Unknown message type: {0}")]
    UnknownType(String),
    #[error("Invalid payload for {message_type}: {reason}")]
    InvalidPayload { message_type: String, reason: String },
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

// =============================================================================
// Client -> Server
// =============================================================================

/// Outer frame of every inbound message
#[derive(Debug, Clone, Deserialize)]
pub struct RawEnvelope {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Messages from client to server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Liveness probe; the only message accepted without a token
    Ping,
    JoinArena(JoinArenaPayload),
    BattleReady(BattleReadyPayload),
    BattleAction(BattleActionPayload),
    LeaveArena(LeaveArenaPayload),
    GetBattleState(GetBattleStatePayload),
    ChatMessage(ChatMessagePayload),
}

impl ClientMessage {
    pub fn type_name(&self) -> &'static str {
        match self {
            ClientMessage::Ping => "ping",
            ClientMessage::JoinArena(_) => "join_arena",
            ClientMessage::BattleReady(_) => "battle_ready",
            ClientMessage::BattleAction(_) => "battle_action",
            ClientMessage::LeaveArena(_) => "leave_arena",
            ClientMessage::GetBattleState(_) => "get_battle_state",
            ClientMessage::ChatMessage(_) => "chat_message",
        }
    }

    pub fn requires_token(&self) -> bool {
        !matches!(self, ClientMessage::Ping)
    }

    /// The `userId` the payload claims to act as, if it carries one.
    pub fn claimed_user_id(&self) -> Option<&str> {
        match self {
            ClientMessage::JoinArena(p) => Some(&p.user_id),
            ClientMessage::BattleReady(p) => Some(&p.user_id),
            ClientMessage::BattleAction(p) => Some(&p.user_id),
            ClientMessage::LeaveArena(p) => Some(&p.user_id),
            ClientMessage::ChatMessage(p) => Some(&p.user_id),
            ClientMessage::Ping | ClientMessage::GetBattleState(_) => None,
        }
    }
}

/// A parsed inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub token: Option<String>,
    pub message: ClientMessage,
}

fn payload<T: DeserializeOwned>(message_type: &str, value: serde_json::Value) -> Result<T, ProtocolError> {
    serde_json::from_value(value).map_err(|e| ProtocolError::InvalidPayload {
        message_type: message_type.to_string(),
        reason: e.to_string(),
    })
}

/// Parse one inbound text frame.
pub fn parse_client_message(text: &str) -> Result<InboundMessage, ProtocolError> {
    let envelope: RawEnvelope =
        serde_json::from_str(text).map_err(|_| ProtocolError::MalformedJson)?;
    let RawEnvelope {
        message_type,
        token,
        payload: body,
    } = envelope;

    let message = match message_type.as_str() {
        "ping" => ClientMessage::Ping,
        "join_arena" => ClientMessage::JoinArena(payload(&message_type, body)?),
        "battle_ready" => ClientMessage::BattleReady(payload(&message_type, body)?),
        "battle_action" => ClientMessage::BattleAction(payload(&message_type, body)?),
        "leave_arena" => ClientMessage::LeaveArena(payload(&message_type, body)?),
        "get_battle_state" => ClientMessage::GetBattleState(payload(&message_type, body)?),
        "chat_message" => ClientMessage::ChatMessage(payload(&message_type, body)?),
        _ => return Err(ProtocolError::UnknownType(message_type)),
    };

    Ok(InboundMessage {
        token: token.filter(|t| !t.is_empty()),
        message,
    })
}

// =============================================================================
// Server -> Client
// =============================================================================

/// Matchmaking progress reported to a queued player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchmakingStatus {
    Searching,
}

/// Messages from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Pong,
    /// A battle was formed (or, in handshake mode, both sides are ready)
    BattleReady { battle_id: Uuid, battle: BattleData },
    /// Queued for PvP; position is 1-based
    Matchmaking {
        status: MatchmakingStatus,
        queue_position: usize,
    },
    BattleUpdate { battle_id: Uuid, battle: BattleData },
    ChatMessage {
        battle_id: Uuid,
        username: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn battle_update(battle: BattleData) -> Self {
        ServerMessage::BattleUpdate {
            battle_id: battle.id,
            battle,
        }
    }

    pub fn battle_ready(battle: BattleData) -> Self {
        ServerMessage::BattleReady {
            battle_id: battle.id,
            battle,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ServerMessage::Pong => "pong",
            ServerMessage::BattleReady { .. } => "battle_ready",
            ServerMessage::Matchmaking { .. } => "matchmaking",
            ServerMessage::BattleUpdate { .. } => "battle_update",
            ServerMessage::ChatMessage { .. } => "chat_message",
            ServerMessage::Error { .. } => "error",
        }
    }
}
