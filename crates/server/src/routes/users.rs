use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{AuthUser, SetUserPhotoRequest, SetUsernameRequest, User, UserSearchQuery};
use crate::AppState;

/// GET /users?q=
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<UserSearchQuery>,
) -> AppResult<Json<Vec<User>>> {
    let q = query.q.unwrap_or_default();
    Ok(Json(state.users.search(q.trim()).await?))
}

/// GET /users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.get_by_id(user.id).await?))
}

/// PUT /users/me/username
pub async fn set_my_username(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<SetUsernameRequest>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.rename(user.id, body.username.trim()).await?))
}

/// PUT /users/me/pic
pub async fn set_my_photo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<SetUserPhotoRequest>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.set_photo(user.id, &body.pic).await?))
}
