use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{AuthUser, Comment, NewComment};
use crate::AppState;

/// GET /conversations/:conversationId/messages/:messageId/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((conversation_id, message_id)): Path<(i64, i64)>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(
        state
            .comments
            .list(message_id, conversation_id, user.id)
            .await?,
    ))
}

/// POST /conversations/:conversationId/messages/:messageId/comments
pub async fn comment_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((conversation_id, message_id)): Path<(i64, i64)>,
    Json(body): Json<NewComment>,
) -> AppResult<impl IntoResponse> {
    let comment = state
        .comments
        .add(message_id, conversation_id, user.id, &body.text)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /conversations/:conversationId/messages/:messageId/comments/:commentId
///
/// Removal is keyed by author: every comment the caller left on the message
/// goes, whichever comment id is in the path.
pub async fn uncomment_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((conversation_id, message_id, _comment_id)): Path<(i64, i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .comments
        .remove(message_id, conversation_id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
