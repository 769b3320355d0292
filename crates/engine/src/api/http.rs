//! HTTP routes.

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use questarena_domain::{BattleError, BattleId, UserId};
use questarena_shared::{
    BattleData, ErrorResponse, HealthResponse, SkillData, SubmitActionRequest,
};

use crate::app::App;
use crate::infrastructure::ports::{AuthError, RepoError};
use crate::use_cases::arena::ArenaError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/skills", get(list_skills))
        .route("/api/battles/{id}", get(get_battle))
        .route("/api/battles/{id}/actions", post(submit_action))
}

async fn health(State(app): State<Arc<App>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(app.clock.now()))
}

async fn list_skills(State(app): State<Arc<App>>) -> Json<Vec<SkillData>> {
    Json(app.catalog.skills().map(SkillData::from).collect())
}

async fn get_battle(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<BattleData>, ApiError> {
    let battle_id = parse_battle_id(&id)?;

    match app.use_cases.arena.battle.snapshot(battle_id) {
        Ok(battle) => return Ok(Json(battle)),
        Err(ArenaError::BattleNotFound) => {}
        Err(e) => return Err(e.into()),
    }

    // No longer live: fall back to the archive.
    if let Some(history) = &app.history {
        if let Some(battle) = history.get(battle_id).await? {
            return Ok(Json(battle));
        }
    }
    Err(ApiError::NotFound("Battle not found".to_string()))
}

async fn submit_action(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<SubmitActionRequest>,
) -> Result<Json<BattleData>, ApiError> {
    let user_id = authenticate(&app, &headers)?;
    let battle_id = parse_battle_id(&id)?;
    let action = request
        .to_battle_action()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let battle = app
        .use_cases
        .arena
        .battle
        .submit(battle_id, user_id, action)
        .await?;
    Ok(Json(battle))
}

fn parse_battle_id(raw: &str) -> Result<BattleId, ApiError> {
    Uuid::parse_str(raw)
        .map(BattleId::from_uuid)
        .map_err(|_| ApiError::NotFound("Battle not found".to_string()))
}

fn authenticate(app: &App, headers: &HeaderMap) -> Result<UserId, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)?;
    Ok(app.tokens.verify(token)?)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error serving request");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ArenaError> for ApiError {
    fn from(e: ArenaError) -> Self {
        let message = e.to_string();
        match e {
            ArenaError::BattleNotFound => ApiError::NotFound(message),
            ArenaError::Battle(BattleError::NotParticipant) => ApiError::Forbidden(message),
            ArenaError::Battle(
                BattleError::SessionNotActive { .. }
                | BattleError::SkillOnCooldown { .. }
                | BattleError::InvalidStateTransition { .. },
            ) => ApiError::Conflict(message),
            ArenaError::Battle(_) => ApiError::BadRequest(message),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Unauthorized(e.to_string())
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
