//! The consistency core. Every operation takes the acting user's id and
//! re-checks current participation against storage itself.

mod comments;
mod conversations;
mod members;
mod messages;
mod users;

pub use comments::CommentStore;
pub use conversations::ConversationRegistry;
pub use members::MembershipManager;
pub use messages::MessageStore;
pub use users::UserDirectory;

use chrono::{SecondsFormat, Utc};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::error::{AppError, AppResult};
use crate::models::ConversationKind;

/// Fixed-width RFC 3339 so lexicographic order matches chronological order.
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Open a transaction that holds the write lock from its first statement.
/// Checks made inside it stay valid until commit, and a concurrent writer
/// waits on the busy timeout instead of failing with `SQLITE_BUSY_SNAPSHOT`.
pub(crate) async fn begin_write(db: &SqlitePool) -> AppResult<Transaction<'static, Sqlite>> {
    Ok(db.begin_with("BEGIN IMMEDIATE").await?)
}

pub(crate) async fn is_participant(
    conn: &mut SqliteConnection,
    conversation_id: i64,
    user_id: i64,
) -> AppResult<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM conversation_participants WHERE conversation_id = ? AND user_id = ?",
    )
    .bind(conversation_id)
    .bind(user_id)
    .fetch_one(conn)
    .await?;

    Ok(count > 0)
}

pub(crate) async fn require_participant(
    conn: &mut SqliteConnection,
    conversation_id: i64,
    user_id: i64,
) -> AppResult<()> {
    if is_participant(conn, conversation_id, user_id).await? {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You are not a participant in this conversation".into(),
        ))
    }
}

/// Fails with `NotFound` unless `conversation_id` names a group conversation.
pub(crate) async fn require_group(conn: &mut SqliteConnection, conversation_id: i64) -> AppResult<()> {
    let kind = sqlx::query_scalar::<_, ConversationKind>("SELECT kind FROM conversations WHERE id = ?")
        .bind(conversation_id)
        .fetch_optional(conn)
        .await?;

    match kind {
        Some(ConversationKind::Group) => Ok(()),
        _ => Err(AppError::NotFound("Group not found".into())),
    }
}

/// Look up the conversation a message lives in and check it against the one
/// the caller named.
pub(crate) async fn message_in_conversation(
    conn: &mut SqliteConnection,
    message_id: i64,
    conversation_id: i64,
) -> AppResult<()> {
    let actual = sqlx::query_scalar::<_, i64>("SELECT conversation_id FROM messages WHERE id = ?")
        .bind(message_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".into()))?;

    if actual != conversation_id {
        return Err(AppError::Mismatch(
            "Message does not belong to the specified conversation".into(),
        ));
    }
    Ok(())
}
