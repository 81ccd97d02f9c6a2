pub mod comments;
pub mod conversations;
pub mod groups;
pub mod messages;
pub mod session;
pub mod users;

use crate::AppState;
use axum::{routing::{get, post, put, delete}, Router};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Session
        .route("/session", post(session::do_login))
        .route("/liveness", get(session::liveness))
        // Users
        .route("/users", get(users::search_users))
        .route("/users/me", get(users::get_me))
        .route("/users/me/username", put(users::set_my_username))
        .route("/users/me/pic", put(users::set_my_photo))
        // Conversations
        .route("/conversations", get(conversations::list_conversations))
        .route("/conversations", post(conversations::start_conversation))
        .route("/conversations/{conversationId}", get(conversations::get_conversation))
        // Groups
        .route("/groups", post(groups::create_group))
        .route("/groups/{groupId}", get(groups::get_group))
        .route("/groups/{groupId}/name", put(groups::set_group_name))
        .route("/groups/{groupId}/photo", put(groups::set_group_photo))
        .route("/groups/{groupId}/members", post(groups::add_members))
        .route("/groups/{groupId}/members", delete(groups::leave_group))
        // Messages
        .route("/conversations/{conversationId}/messages", post(messages::send_message))
        .route("/conversations/{conversationId}/messages/{messageId}", delete(messages::delete_message))
        .route("/conversations/{conversationId}/messages/{messageId}/forward", post(messages::forward_message))
        // Comments
        .route("/conversations/{conversationId}/messages/{messageId}/comments", get(comments::list_comments))
        .route("/conversations/{conversationId}/messages/{messageId}/comments", post(comments::comment_message))
        .route("/conversations/{conversationId}/messages/{messageId}/comments/{commentId}", delete(comments::uncomment_message))
        .with_state(state)
}
