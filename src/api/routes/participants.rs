use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::Claims;
use crate::api::routes::{api_error, internal_error, ApiError};
use crate::api::AppState;
use crate::application::registration::{
    JoinGame, JoinGameError, JoinGameInput, ListParticipants, ListParticipantsError,
    ListParticipantsInput, RemoveParticipant, RemoveParticipantError, RemoveParticipantInput,
    UpdateParticipantError, UpdateParticipantInput, UpdateParticipantStatus,
};
use crate::domain::entities::{GameParticipant, ParticipantRoster, ParticipantStatus};
use crate::domain::services::RankedCandidate;
use crate::infrastructure::app_state::NotificationKind;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    pub user_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParticipantRequest {
    pub participant_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveParticipantQuery {
    pub participant_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    pub success: bool,
    pub game_id: String,
    pub current_participants: u32,
    pub max_participants: Option<u32>,
    pub participants: ParticipantRoster,
}

#[derive(Debug, Serialize)]
pub struct JoinGameResponse {
    pub success: bool,
    pub status: ParticipantStatus,
    pub participant: GameParticipant,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParticipantResponse {
    pub success: bool,
    pub previous_status: ParticipantStatus,
    pub participant: GameParticipant,
    pub promoted: Vec<RankedCandidate>,
}

#[derive(Debug, Serialize)]
pub struct RemoveParticipantResponse {
    pub success: bool,
    pub removed: GameParticipant,
    pub promoted: Vec<RankedCandidate>,
}

fn parse_status(raw: &str) -> Result<ParticipantStatus, ApiError> {
    ParticipantStatus::from_str(raw).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_STATUS",
            format!("Unknown participant status '{}'", raw),
        )
    })
}

/// Tell each promoted user they got a slot
fn notify_promotions(state: &AppState, game_id: &str, promoted: &[RankedCandidate]) {
    for candidate in promoted {
        state.notify(
            &candidate.participant.user_id,
            NotificationKind::WaitlistPromoted,
            game_id,
            serde_json::json!({ "score": candidate.score.total }),
        );
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/games/:gameId/participants - Registry grouped by status
pub async fn list_participants(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<RosterResponse>, ApiError> {
    let use_case = ListParticipants::new(state.game_repo.clone());
    let result = use_case
        .execute(ListParticipantsInput { game_id })
        .await
        .map_err(|e| match e {
            ListParticipantsError::GameNotFound => api_error(StatusCode::NOT_FOUND, "GAME_NOT_FOUND", e),
            ListParticipantsError::Repository(e) => {
                internal_error("LIST_PARTICIPANTS_ERROR", "Failed to list participants", e)
            }
        })?;

    Ok(Json(RosterResponse {
        success: true,
        game_id: result.game.id,
        current_participants: result.game.current_participants,
        max_participants: result.game.max_participants,
        participants: result.roster,
    }))
}

/// POST /api/games/:gameId/participants - Join, or get waitlisted when full
pub async fn join_game(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(game_id): Path<String>,
    body: Option<Json<JoinGameRequest>>,
) -> Result<(StatusCode, Json<JoinGameResponse>), ApiError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let status = body.status.as_deref().map(parse_status).transpose()?;

    let use_case = JoinGame::new(
        state.game_repo.clone(),
        state.group_repo.clone(),
        state.config.tx_retries,
    );
    let result = use_case
        .execute(JoinGameInput {
            actor_id: claims.user_id.clone(),
            game_id,
            user_id: body.user_id,
            status,
        })
        .await
        .map_err(|e| match e {
            JoinGameError::Validation(msg) => api_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            JoinGameError::GameNotFound => api_error(StatusCode::NOT_FOUND, "GAME_NOT_FOUND", e),
            JoinGameError::GameNotOpen => api_error(StatusCode::CONFLICT, "GAME_NOT_OPEN", e),
            JoinGameError::Forbidden => api_error(StatusCode::FORBIDDEN, "FORBIDDEN", e),
            JoinGameError::AlreadyRegistered => api_error(StatusCode::CONFLICT, "ALREADY_REGISTERED", e),
            JoinGameError::GameFull => api_error(StatusCode::CONFLICT, "GAME_FULL", e),
            JoinGameError::Repository(e) => internal_error("JOIN_GAME_ERROR", "Failed to join game", e),
        })?;

    if result.participant.user_id != claims.user_id {
        state.notify(
            &result.participant.user_id,
            NotificationKind::RegistrationChanged,
            &result.game.id,
            serde_json::json!({ "title": result.game.title, "status": result.participant.status }),
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(JoinGameResponse {
            success: true,
            status: result.participant.status,
            participant: result.participant,
        }),
    ))
}

/// PUT /api/games/:gameId/participants - Change a registration's status
pub async fn update_participant(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(game_id): Path<String>,
    Json(body): Json<UpdateParticipantRequest>,
) -> Result<Json<UpdateParticipantResponse>, ApiError> {
    let status = parse_status(&body.status)?;

    let use_case = UpdateParticipantStatus::new(
        state.game_repo.clone(),
        state.group_repo.clone(),
        state.config.history_window,
        state.config.tx_retries,
    );
    let result = use_case
        .execute(UpdateParticipantInput {
            actor_id: claims.user_id.clone(),
            game_id,
            user_id: body.participant_id,
            status,
        })
        .await
        .map_err(|e| match e {
            UpdateParticipantError::GameNotFound => api_error(StatusCode::NOT_FOUND, "GAME_NOT_FOUND", e),
            UpdateParticipantError::GameClosed => api_error(StatusCode::CONFLICT, "GAME_CLOSED", e),
            UpdateParticipantError::ParticipantNotFound => {
                api_error(StatusCode::NOT_FOUND, "PARTICIPANT_NOT_FOUND", e)
            }
            UpdateParticipantError::Forbidden => api_error(StatusCode::FORBIDDEN, "FORBIDDEN", e),
            UpdateParticipantError::GameFull => api_error(StatusCode::CONFLICT, "GAME_FULL", e),
            UpdateParticipantError::Repository(e) => {
                internal_error("UPDATE_PARTICIPANT_ERROR", "Failed to update participant", e)
            }
        })?;

    let participant = result.change.participant;
    if participant.user_id != claims.user_id {
        state.notify(
            &participant.user_id,
            NotificationKind::RegistrationChanged,
            &result.game.id,
            serde_json::json!({ "title": result.game.title, "status": participant.status }),
        );
    }
    notify_promotions(&state, &result.game.id, &result.promoted);

    Ok(Json(UpdateParticipantResponse {
        success: true,
        previous_status: result.change.previous,
        participant,
        promoted: result.promoted,
    }))
}

/// DELETE /api/games/:gameId/participants?participantId= - Drop a registration
pub async fn remove_participant(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(game_id): Path<String>,
    Query(query): Query<RemoveParticipantQuery>,
) -> Result<Json<RemoveParticipantResponse>, ApiError> {
    let user_id = query
        .participant_id
        .unwrap_or_else(|| claims.user_id.clone());

    let use_case = RemoveParticipant::new(
        state.game_repo.clone(),
        state.group_repo.clone(),
        state.config.history_window,
        state.config.tx_retries,
    );
    let result = use_case
        .execute(RemoveParticipantInput {
            actor_id: claims.user_id.clone(),
            game_id: game_id.clone(),
            user_id,
        })
        .await
        .map_err(|e| match e {
            RemoveParticipantError::GameNotFound => api_error(StatusCode::NOT_FOUND, "GAME_NOT_FOUND", e),
            RemoveParticipantError::GameClosed => api_error(StatusCode::CONFLICT, "GAME_CLOSED", e),
            RemoveParticipantError::ParticipantNotFound => {
                api_error(StatusCode::NOT_FOUND, "PARTICIPANT_NOT_FOUND", e)
            }
            RemoveParticipantError::Forbidden => api_error(StatusCode::FORBIDDEN, "FORBIDDEN", e),
            RemoveParticipantError::Repository(e) => {
                internal_error("REMOVE_PARTICIPANT_ERROR", "Failed to remove participant", e)
            }
        })?;

    if result.removed.user_id != claims.user_id {
        state.notify(
            &result.removed.user_id,
            NotificationKind::RegistrationRemoved,
            &game_id,
            serde_json::json!({ "previousStatus": result.removed.status }),
        );
    }
    notify_promotions(&state, &game_id, &result.promoted);

    Ok(Json(RemoveParticipantResponse {
        success: true,
        removed: result.removed,
        promoted: result.promoted,
    }))
}
