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
use crate::application::group::{
    AddGroupMember, AddGroupMemberError, AddGroupMemberInput, CreateGroup, CreateGroupError,
    CreateGroupInput, GetMemberPriority, GetMemberPriorityError, GetMemberPriorityInput,
    ListGroupMembers, ListGroupMembersError, ListGroupMembersInput,
};
use crate::domain::entities::{Group, GroupMember, GroupRole};
use crate::domain::value_objects::PriorityScore;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: String,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateGroupResponse {
    pub success: bool,
    pub group: Group,
    pub owner: GroupMember,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub success: bool,
    pub member: GroupMember,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersResponse {
    pub success: bool,
    pub group_id: String,
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityResponse {
    pub success: bool,
    pub group_id: String,
    pub user_id: String,
    pub cold_start: bool,
    pub score: PriorityScore,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/groups - Create a group owned by the caller
pub async fn create_group(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<CreateGroupResponse>), ApiError> {
    let use_case = CreateGroup::new(state.group_repo.clone());
    let result = use_case
        .execute(CreateGroupInput {
            owner_id: claims.user_id,
            name: body.name,
        })
        .await
        .map_err(|e| match e {
            CreateGroupError::Validation(msg) => api_error(StatusCode::BAD_REQUEST, "MISSING_GROUP_NAME", msg),
            CreateGroupError::Repository(e) => internal_error("CREATE_GROUP_ERROR", "Failed to create group", e),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateGroupResponse {
            success: true,
            group: result.group,
            owner: result.owner,
        }),
    ))
}

/// POST /api/groups/:groupId/members - Add a member (hosts only)
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(group_id): Path<String>,
    Json(body): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let role = match body.role.as_deref() {
        None => GroupRole::Member,
        Some(raw) => GroupRole::from_str(raw).ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                "INVALID_ROLE",
                format!("Unknown role '{}'", raw),
            )
        })?,
    };

    let use_case = AddGroupMember::new(state.group_repo.clone());
    let result = use_case
        .execute(AddGroupMemberInput {
            actor_id: claims.user_id,
            group_id,
            user_id: body.user_id,
            role,
        })
        .await
        .map_err(|e| match e {
            AddGroupMemberError::Validation(msg) => api_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AddGroupMemberError::GroupNotFound => api_error(StatusCode::NOT_FOUND, "GROUP_NOT_FOUND", e),
            AddGroupMemberError::Forbidden => api_error(StatusCode::FORBIDDEN, "FORBIDDEN", e),
            AddGroupMemberError::AlreadyMember => api_error(StatusCode::CONFLICT, "ALREADY_MEMBER", e),
            AddGroupMemberError::Repository(e) => internal_error("ADD_MEMBER_ERROR", "Failed to add member", e),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(MemberResponse {
            success: true,
            member: result.member,
        }),
    ))
}

/// GET /api/groups/:groupId/members - Members, earliest first
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<String>,
) -> Result<Json<MembersResponse>, ApiError> {
    let use_case = ListGroupMembers::new(state.group_repo.clone());
    let result = use_case
        .execute(ListGroupMembersInput { group_id })
        .await
        .map_err(|e| match e {
            ListGroupMembersError::GroupNotFound => api_error(StatusCode::NOT_FOUND, "GROUP_NOT_FOUND", e),
            ListGroupMembersError::Repository(e) => {
                internal_error("LIST_MEMBERS_ERROR", "Failed to list members", e)
            }
        })?;

    Ok(Json(MembersResponse {
        success: true,
        group_id: result.group.id,
        members: result.members,
    }))
}

/// GET /api/groups/:groupId/members/:userId/priority - Current waitlist priority
pub async fn get_member_priority(
    State(state): State<Arc<AppState>>,
    Path((group_id, user_id)): Path<(String, String)>,
) -> Result<Json<PriorityResponse>, ApiError> {
    let use_case = GetMemberPriority::new(
        state.game_repo.clone(),
        state.group_repo.clone(),
        state.config.history_window,
    );
    let result = use_case
        .execute(GetMemberPriorityInput {
            group_id: group_id.clone(),
            user_id: user_id.clone(),
        })
        .await
        .map_err(|e| match e {
            GetMemberPriorityError::GroupNotFound => api_error(StatusCode::NOT_FOUND, "GROUP_NOT_FOUND", e),
            GetMemberPriorityError::Repository(e) => {
                internal_error("GET_PRIORITY_ERROR", "Failed to compute priority", e)
            }
        })?;

    Ok(Json(PriorityResponse {
        success: true,
        group_id,
        user_id,
        cold_start: result.score.is_cold_start(),
        score: result.score,
    }))
}
