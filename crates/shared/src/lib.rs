//! QuestArena Protocol - wire types shared by the arena's WebSocket and REST surfaces
//!
//! - Inbound envelope parsing and `ClientMessage`
//! - Outbound `ServerMessage`
//! - Battle snapshot DTOs and REST bodies
//!
//! # Design Principles
//!
//! 1. **No business logic** - pure data types, serialization and projections
//! 2. **Raw ids on the wire** - `uuid::Uuid` for battles, strings for users and skills

pub mod messages;
pub mod requests;
pub mod responses;

pub use messages::{
    parse_client_message, ClientMessage, InboundMessage, MatchmakingStatus, ProtocolError,
    RawEnvelope, ServerMessage,
};
pub use requests::{
    ActionKind, BattleActionPayload, BattleReadyPayload, ChatMessagePayload,
    GetBattleStatePayload, JoinArenaPayload, LeaveArenaPayload, SubmitActionRequest,
};
pub use responses::{
    BattleData, ErrorResponse, HealthResponse, ParticipantData, RoundActionData, RoundData,
    RoundOutcomeData, SkillData,
};
