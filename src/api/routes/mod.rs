pub mod games;
pub mod groups;
pub mod health;
pub mod participants;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::api::middleware::auth_middleware;
use crate::api::sse;
use crate::api::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, code: &str, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            code: code.to_string(),
            details: None,
        }),
    )
}

/// 500 carrying the underlying error as details
pub(crate) fn internal_error(code: &str, message: &str, e: impl ToString) -> ApiError {
    tracing::error!(code, error = %e.to_string(), "{}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
            code: code.to_string(),
            details: Some(e.to_string()),
        }),
    )
}

/// Create the main API router
pub fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/groups", create_group_router(state.clone()))
        .nest("/games", create_game_router(state.clone()))
        .route("/events", get(sse::sse_handler))
        .route("/health", get(health::health_handler))
        .with_state(state)
}

/// Create group router
fn create_group_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            post(groups::create_group).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:groupId/members",
            get(groups::list_members)
                .post(groups::add_member)
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/:groupId/members/:userId/priority",
            get(groups::get_member_priority).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state)
}

/// Create game router
fn create_game_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            post(games::create_game).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:gameId",
            get(games::get_game).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:gameId/status",
            post(games::update_game_status).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/:gameId/participants",
            get(participants::list_participants)
                .post(participants::join_game)
                .put(participants::update_participant)
                .delete(participants::remove_participant)
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .route(
            "/:gameId/waitlist",
            get(games::get_waitlist).layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state)
}
