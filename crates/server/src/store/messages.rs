use parley_shared::constants::COMMENT_AUTHOR_PREVIEW;
use parley_shared::validation::validate_message_text;
use sqlx::{SqliteConnection, SqlitePool};

use super::{begin_write, message_in_conversation, now, require_participant};
use crate::error::{AppError, AppResult};
use crate::models::{Message, MessageKind, MessageRow, NewMessage, Payload, Photo};

const MESSAGE_COLUMNS: &str = r#"SELECT m.id, m.conversation_id, u.username AS sender,
           m.kind, m.text, m.photo, m.created_at
    FROM messages m
    INNER JOIN users u ON u.id = m.sender_id"#;

/// Append-only per-conversation message log.
#[derive(Clone)]
pub struct MessageStore {
    db: SqlitePool,
}

impl MessageStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Participation is checked inside the same write transaction as the
    /// insert, so a member removed concurrently cannot post.
    pub async fn send(&self, conversation_id: i64, sender_id: i64, message: &NewMessage) -> AppResult<Message> {
        let mut tx = begin_write(&self.db).await?;
        require_participant(&mut tx, conversation_id, sender_id).await?;

        let payload = parse_payload(message)?;
        let id = insert(&mut tx, conversation_id, sender_id, &payload).await?;
        let sent = fetch(&mut tx, id).await?;

        tx.commit().await?;

        tracing::info!(message_id = id, conversation_id, sender_id, kind = ?payload.kind(), "Message sent");
        Ok(sent)
    }

    /// Copy a message into `target_conversation_id` as a new message owned by
    /// `actor_id`. Only membership of the target is required.
    pub async fn forward(&self, message_id: i64, target_conversation_id: i64, actor_id: i64) -> AppResult<Message> {
        let mut tx = begin_write(&self.db).await?;

        let source = sqlx::query_as::<_, MessageRow>(&format!("{} WHERE m.id = ?", MESSAGE_COLUMNS))
            .bind(message_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Original message not found".into()))?;

        require_participant(&mut tx, target_conversation_id, actor_id).await?;

        let payload = stored_payload(source)?;
        let id = insert(&mut tx, target_conversation_id, actor_id, &payload).await?;
        let copy = fetch(&mut tx, id).await?;

        tx.commit().await?;

        tracing::info!(
            message_id = id,
            source_message_id = message_id,
            conversation_id = target_conversation_id,
            actor_id,
            "Message forwarded"
        );
        Ok(copy)
    }

    /// Delete a message and all of its comments. Only the sender may do so.
    pub async fn delete(&self, message_id: i64, conversation_id: i64, actor_id: i64) -> AppResult<()> {
        let mut tx = begin_write(&self.db).await?;

        message_in_conversation(&mut tx, message_id, conversation_id).await?;

        let sender_id = sqlx::query_scalar::<_, i64>("SELECT sender_id FROM messages WHERE id = ?")
            .bind(message_id)
            .fetch_one(&mut *tx)
            .await?;

        if sender_id != actor_id {
            return Err(AppError::Forbidden("Only the sender can delete this message".into()));
        }
        require_participant(&mut tx, conversation_id, actor_id).await?;

        sqlx::query("DELETE FROM comments WHERE message_id = ?")
            .bind(message_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(message_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(message_id, conversation_id, actor_id, "Message deleted");
        Ok(())
    }
}

/// Check the kind/payload exclusivity rule and decode any photo.
fn parse_payload(message: &NewMessage) -> AppResult<Payload> {
    let kind: MessageKind = message.kind.parse().map_err(AppError::Validation)?;

    match kind {
        MessageKind::Text => {
            if message.photo.is_some() {
                return Err(AppError::Validation("Text message cannot carry a photo".into()));
            }
            let text = message
                .text
                .as_deref()
                .ok_or_else(|| AppError::Validation("Text message requires text content".into()))?;
            validate_message_text(text).map_err(AppError::Validation)?;
            Ok(Payload::Text(text.to_string()))
        }
        MessageKind::Photo => {
            if message.text.is_some() {
                return Err(AppError::Validation("Photo message cannot carry text".into()));
            }
            let encoded = message.photo.as_deref().ok_or_else(|| {
                AppError::Validation("Photo message requires photo content (base64 encoded)".into())
            })?;
            Ok(Payload::Photo(Photo::from_base64(encoded)?))
        }
    }
}

/// Payload of a stored row. A row whose payload does not match its kind is
/// storage corruption, not a missing message.
fn stored_payload(row: MessageRow) -> AppResult<Payload> {
    match (row.kind, row.text, row.photo) {
        (MessageKind::Text, Some(text), _) => Ok(Payload::Text(text)),
        (MessageKind::Photo, _, Some(photo)) => Ok(Payload::Photo(Photo::from_stored(photo))),
        (kind, _, _) => Err(AppError::Internal(sqlx::Error::Decode(
            format!("message {} has no {:?} payload", row.id, kind).into(),
        ))),
    }
}

async fn insert(conn: &mut SqliteConnection, conversation_id: i64, sender_id: i64, payload: &Payload) -> AppResult<i64> {
    let (text, photo) = match payload {
        Payload::Text(text) => (Some(text.as_str()), None),
        Payload::Photo(photo) => (None, Some(photo.as_bytes())),
    };

    let id = sqlx::query(
        "INSERT INTO messages (conversation_id, sender_id, kind, text, photo, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(conversation_id)
    .bind(sender_id)
    .bind(payload.kind())
    .bind(text)
    .bind(photo)
    .bind(now())
    .execute(conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// One message with its comment count and recent commenters.
pub(crate) async fn fetch(conn: &mut SqliteConnection, message_id: i64) -> AppResult<Message> {
    let row = sqlx::query_as::<_, MessageRow>(&format!("{} WHERE m.id = ?", MESSAGE_COLUMNS))
        .bind(message_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".into()))?;

    hydrate(conn, row).await
}

/// Every message of a conversation in timestamp order.
pub(crate) async fn for_conversation(conn: &mut SqliteConnection, conversation_id: i64) -> AppResult<Vec<Message>> {
    let rows = sqlx::query_as::<_, MessageRow>(&format!(
        "{} WHERE m.conversation_id = ? ORDER BY m.created_at ASC, m.id ASC",
        MESSAGE_COLUMNS
    ))
    .bind(conversation_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut messages = Vec::with_capacity(rows.len());
    for row in rows {
        messages.push(hydrate(&mut *conn, row).await?);
    }
    Ok(messages)
}

async fn hydrate(conn: &mut SqliteConnection, row: MessageRow) -> AppResult<Message> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE message_id = ?")
        .bind(row.id)
        .fetch_one(&mut *conn)
        .await?;

    let authors = if count == 0 {
        Vec::new()
    } else {
        sqlx::query_scalar::<_, String>(
            r#"SELECT u.username FROM comments c
               INNER JOIN users u ON u.id = c.author_id
               WHERE c.message_id = ?
               GROUP BY c.author_id
               ORDER BY MAX(c.created_at) DESC, MAX(c.id) DESC
               LIMIT ?"#,
        )
        .bind(row.id)
        .bind(COMMENT_AUTHOR_PREVIEW)
        .fetch_all(&mut *conn)
        .await?
    };

    Ok(row.into_message(count, authors))
}
