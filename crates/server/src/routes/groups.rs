use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use parley_shared::validation::validate_group_name;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{
    AddMembersRequest, AuthUser, CreateGroupRequest, Group, SetGroupNameRequest,
    SetGroupPhotoRequest,
};
use crate::AppState;

/// POST /groups
pub async fn create_group(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<CreateGroupRequest>,
) -> AppResult<impl IntoResponse> {
    validate_group_name(&body.name).map_err(AppError::Validation)?;

    let conversation = state.conversations.create_group(user.id, body.name.trim()).await?;
    Ok((StatusCode::CREATED, Json(Group::from(conversation))))
}

/// GET /groups/:groupId
pub async fn get_group(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
) -> AppResult<Json<Group>> {
    let conversation = state.conversations.get_group(group_id, user.id).await?;
    Ok(Json(conversation.into()))
}

/// PUT /groups/:groupId/name
pub async fn set_group_name(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
    Json(body): Json<SetGroupNameRequest>,
) -> AppResult<Json<Group>> {
    validate_group_name(&body.name).map_err(AppError::Validation)?;

    let conversation = state
        .conversations
        .rename(group_id, user.id, body.name.trim())
        .await?;
    Ok(Json(conversation.into()))
}

/// PUT /groups/:groupId/photo
pub async fn set_group_photo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
    Json(body): Json<SetGroupPhotoRequest>,
) -> AppResult<Json<Group>> {
    let conversation = state
        .conversations
        .set_photo(group_id, user.id, &body.photo)
        .await?;
    Ok(Json(conversation.into()))
}

/// POST /groups/:groupId/members
pub async fn add_members(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
    Json(body): Json<AddMembersRequest>,
) -> AppResult<Json<Group>> {
    if body.members.is_empty() {
        return Err(AppError::Validation(
            "At least one member username is required".into(),
        ));
    }

    let conversation = state
        .members
        .add_members(group_id, user.id, &body.members)
        .await?;
    Ok(Json(conversation.into()))
}

/// DELETE /groups/:groupId/members
///
/// The caller leaves the group.
pub async fn leave_group(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(group_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.members.remove_member(group_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
