use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{AuthUser, ForwardRequest, NewMessage};
use crate::AppState;

/// POST /conversations/:conversationId/messages
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(conversation_id): Path<i64>,
    Json(body): Json<NewMessage>,
) -> AppResult<impl IntoResponse> {
    let message = state.messages.send(conversation_id, user.id, &body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /conversations/:conversationId/messages/:messageId/forward
///
/// The source conversation in the path is not checked; only membership of
/// the recipient conversation matters.
pub async fn forward_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((_conversation_id, message_id)): Path<(i64, i64)>,
    Json(body): Json<ForwardRequest>,
) -> AppResult<impl IntoResponse> {
    let message = state
        .messages
        .forward(message_id, body.recipient_conversation_id, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// DELETE /conversations/:conversationId/messages/:messageId
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path((conversation_id, message_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .messages
        .delete(message_id, conversation_id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
