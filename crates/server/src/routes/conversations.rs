use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{AuthUser, Conversation, ConversationSummary, StartConversationRequest};
use crate::AppState;

/// GET /conversations
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<Vec<ConversationSummary>>> {
    Ok(Json(state.conversations.list_for_user(user.id).await?))
}

/// POST /conversations
///
/// Returns the existing direct conversation with the recipient if there is one.
pub async fn start_conversation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<StartConversationRequest>,
) -> AppResult<impl IntoResponse> {
    let recipient = body.recipient.trim();
    if recipient.is_empty() {
        return Err(AppError::Validation("Recipient username is required".into()));
    }

    let conversation = state.conversations.start_direct(user.id, recipient).await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

/// GET /conversations/:conversationId
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(conversation_id): Path<i64>,
) -> AppResult<Json<Conversation>> {
    Ok(Json(state.conversations.get(conversation_id, user.id).await?))
}
