use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::Claims;
use crate::api::routes::{api_error, internal_error, ApiError};
use crate::api::AppState;
use crate::application::game::{
    CreateGame, CreateGameError, CreateGameInput, GetGame, GetGameError, GetGameInput,
    UpdateGameStatus, UpdateGameStatusError, UpdateGameStatusInput,
};
use crate::application::registration::{RankWaitlist, RankWaitlistError, RankWaitlistInput};
use crate::domain::entities::{Game, GameStatus};
use crate::domain::services::RankedCandidate;
use crate::infrastructure::app_state::NotificationKind;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub group_id: String,
    pub title: String,
    pub scheduled_time: i64,
    pub max_participants: Option<u32>,
    pub min_participants: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGameStatusRequest {
    pub status: String,
}

/// Game with the confirmed and waitlisted user ids derived from the registry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    #[serde(flatten)]
    pub game: Game,
    pub participant_ids: Vec<String>,
    pub waitlist_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GameEnvelope {
    pub success: bool,
    pub game: GameResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatusResponse {
    pub success: bool,
    pub game: Game,
    pub previous_status: GameStatus,
    pub notified: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistResponse {
    pub success: bool,
    pub game_id: String,
    /// Open confirmed slots, null for uncapped games
    pub available_spots: Option<u32>,
    pub candidates: Vec<RankedCandidate>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/games - Schedule a game in a group
pub async fn create_game(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameEnvelope>), ApiError> {
    let use_case = CreateGame::new(state.game_repo.clone(), state.group_repo.clone());
    let result = use_case
        .execute(CreateGameInput {
            host_id: claims.user_id,
            group_id: body.group_id,
            title: body.title,
            scheduled_time: body.scheduled_time,
            max_participants: body.max_participants,
            min_participants: body.min_participants.unwrap_or(0),
        })
        .await
        .map_err(|e| match e {
            CreateGameError::Validation(msg) => api_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            CreateGameError::GroupNotFound => api_error(StatusCode::NOT_FOUND, "GROUP_NOT_FOUND", e),
            CreateGameError::Forbidden => api_error(StatusCode::FORBIDDEN, "FORBIDDEN", e),
            CreateGameError::Repository(e) => internal_error("CREATE_GAME_ERROR", "Failed to create game", e),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(GameEnvelope {
            success: true,
            game: GameResponse {
                game: result.game,
                participant_ids: Vec::new(),
                waitlist_ids: Vec::new(),
            },
        }),
    ))
}

/// GET /api/games/:gameId - Game with its participant and waitlist ids
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<GameEnvelope>, ApiError> {
    let use_case = GetGame::new(state.game_repo.clone());
    let result = use_case
        .execute(GetGameInput { game_id })
        .await
        .map_err(|e| match e {
            GetGameError::GameNotFound => api_error(StatusCode::NOT_FOUND, "GAME_NOT_FOUND", e),
            GetGameError::Repository(e) => internal_error("GET_GAME_ERROR", "Failed to get game", e),
        })?;

    Ok(Json(GameEnvelope {
        success: true,
        game: GameResponse {
            game: result.game,
            participant_ids: result.participant_ids,
            waitlist_ids: result.waitlist_ids,
        },
    }))
}

/// POST /api/games/:gameId/status - Move the game along its lifecycle
pub async fn update_game_status(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(game_id): Path<String>,
    Json(body): Json<UpdateGameStatusRequest>,
) -> Result<Json<GameStatusResponse>, ApiError> {
    let status = GameStatus::from_str(&body.status).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_STATUS",
            format!("Unknown game status '{}'", body.status),
        )
    })?;

    let use_case = UpdateGameStatus::new(state.game_repo.clone(), state.group_repo.clone());
    let result = use_case
        .execute(UpdateGameStatusInput {
            actor_id: claims.user_id,
            game_id,
            status,
        })
        .await
        .map_err(|e| match e {
            UpdateGameStatusError::GameNotFound => api_error(StatusCode::NOT_FOUND, "GAME_NOT_FOUND", e),
            UpdateGameStatusError::Forbidden => api_error(StatusCode::FORBIDDEN, "FORBIDDEN", e),
            UpdateGameStatusError::InvalidTransition(_) => {
                api_error(StatusCode::BAD_REQUEST, "INVALID_TRANSITION", e)
            }
            UpdateGameStatusError::Repository(e) => {
                internal_error("UPDATE_GAME_STATUS_ERROR", "Failed to update game status", e)
            }
        })?;

    let kind = if result.game.status == GameStatus::Canceled {
        NotificationKind::GameCanceled
    } else {
        NotificationKind::GameStatusChanged
    };
    for participant in &result.participants {
        state.notify(
            &participant.user_id,
            kind,
            &result.game.id,
            serde_json::json!({
                "title": result.game.title,
                "status": result.game.status,
                "participantStatus": participant.status,
            }),
        );
    }

    Ok(Json(GameStatusResponse {
        success: true,
        notified: result.participants.len(),
        previous_status: result.previous,
        game: result.game,
    }))
}

/// GET /api/games/:gameId/waitlist - Waitlist in promotion order, with scores
pub async fn get_waitlist(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<WaitlistResponse>, ApiError> {
    let use_case = RankWaitlist::new(state.game_repo.clone(), state.config.history_window);
    let result = use_case
        .execute(RankWaitlistInput { game_id })
        .await
        .map_err(|e| match e {
            RankWaitlistError::GameNotFound => api_error(StatusCode::NOT_FOUND, "GAME_NOT_FOUND", e),
            RankWaitlistError::Repository(e) => {
                internal_error("GET_WAITLIST_ERROR", "Failed to rank waitlist", e)
            }
        })?;

    Ok(Json(WaitlistResponse {
        success: true,
        available_spots: result.game.available_spots(result.game.current_participants),
        game_id: result.game.id,
        candidates: result.candidates,
    }))
}
