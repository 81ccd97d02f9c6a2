use parley_shared::constants::{CONVERSATION_LIST_LIMIT, PHOTO_PREVIEW};
use sqlx::{SqliteConnection, SqlitePool};

use super::{begin_write, messages, now, require_group, require_participant};
use crate::error::{AppError, AppResult};
use crate::models::{
    Conversation, ConversationRow, ConversationSummary, MessagePreview, Photo,
    SummaryRow,
};

/// Creates and retrieves direct and group conversations.
#[derive(Clone)]
pub struct ConversationRegistry {
    db: SqlitePool,
}

/// Storage key of a direct conversation: the unordered pair, smaller id first.
fn direct_key(a: i64, b: i64) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{}:{}", lo, hi)
}

impl ConversationRegistry {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Find or create the one direct conversation between `initiator_id` and
    /// the user named `recipient_username`.
    pub async fn start_direct(
        &self,
        initiator_id: i64,
        recipient_username: &str,
    ) -> AppResult<Conversation> {
        let recipient_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
            .bind(recipient_username)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipient user not found".into()))?;

        if recipient_id == initiator_id {
            return Err(AppError::Validation(
                "Cannot start a conversation with yourself".into(),
            ));
        }

        let key = direct_key(initiator_id, recipient_id);
        let now = now();
        let mut tx = begin_write(&self.db).await?;

        let inserted = sqlx::query(
            "INSERT INTO conversations (kind, direct_key, created_at, updated_at) VALUES ('direct', ?, ?, ?)
             ON CONFLICT(direct_key) DO NOTHING",
        )
        .bind(&key)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let conversation_id = if inserted.rows_affected() == 1 {
            let id = inserted.last_insert_rowid();
            for user_id in [initiator_id, recipient_id] {
                sqlx::query(
                    "INSERT INTO conversation_participants (conversation_id, user_id, joined_at) VALUES (?, ?, ?)",
                )
                .bind(id)
                .bind(user_id)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            }
            tracing::info!(conversation_id = id, initiator_id, recipient_id, "Direct conversation created");
            id
        } else {
            sqlx::query_scalar::<_, i64>("SELECT id FROM conversations WHERE direct_key = ?")
                .bind(&key)
                .fetch_one(&mut *tx)
                .await?
        };

        tx.commit().await?;

        self.get(conversation_id, initiator_id).await
    }

    /// New group with `creator_id` as its only participant. The name is stored as given.
    pub async fn create_group(&self, creator_id: i64, name: &str) -> AppResult<Conversation> {
        let now = now();
        let mut tx = begin_write(&self.db).await?;

        let id = sqlx::query(
            "INSERT INTO conversations (kind, name, created_at, updated_at) VALUES ('group', ?, ?, ?)",
        )
        .bind(name)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query(
            "INSERT INTO conversation_participants (conversation_id, user_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(id)
        .bind(creator_id)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(conversation_id = id, creator_id, "Group created");
        self.get(id, creator_id).await
    }

    /// Fully hydrated conversation, visible only to current participants.
    ///
    /// Participation is checked before existence so that outsiders cannot
    /// probe which conversation ids exist.
    pub async fn get(&self, conversation_id: i64, requesting_user_id: i64) -> AppResult<Conversation> {
        let mut conn = self.db.acquire().await?;
        require_participant(&mut conn, conversation_id, requesting_user_id).await?;
        load(&mut conn, conversation_id).await
    }

    /// The group view of a conversation. Direct conversations are not groups.
    pub async fn get_group(&self, conversation_id: i64, requesting_user_id: i64) -> AppResult<Conversation> {
        let mut conn = self.db.acquire().await?;
        require_group(&mut conn, conversation_id).await?;
        require_participant(&mut conn, conversation_id, requesting_user_id).await?;
        load(&mut conn, conversation_id).await
    }

    /// Every conversation `user_id` takes part in, most recently active first.
    /// Conversations without messages come last.
    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<ConversationSummary>> {
        let mut conn = self.db.acquire().await?;

        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"SELECT c.id, c.kind, c.name, c.convo_pic,
                      (SELECT m.created_at FROM messages m
                        WHERE m.conversation_id = c.id
                        ORDER BY m.created_at DESC, m.id DESC LIMIT 1) AS last_timestamp,
                      (SELECT CASE WHEN m.kind = 'photo' THEN ? ELSE m.text END FROM messages m
                        WHERE m.conversation_id = c.id
                        ORDER BY m.created_at DESC, m.id DESC LIMIT 1) AS last_preview
               FROM conversations c
               INNER JOIN conversation_participants cp ON cp.conversation_id = c.id
               WHERE cp.user_id = ?
               ORDER BY last_timestamp IS NULL, last_timestamp DESC, c.id DESC
               LIMIT ?"#,
        )
        .bind(PHOTO_PREVIEW)
        .bind(user_id)
        .bind(CONVERSATION_LIST_LIMIT)
        .fetch_all(&mut *conn)
        .await?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            let participants = participants(&mut conn, row.id).await?;
            let last_message = match (row.last_timestamp, row.last_preview) {
                (Some(timestamp), Some(preview)) => Some(MessagePreview { timestamp, preview }),
                _ => None,
            };
            summaries.push(ConversationSummary {
                id: row.id,
                kind: row.kind,
                name: row.name,
                participants,
                convo_pic: row.convo_pic.map(Photo::from_stored),
                last_message,
            });
        }

        tracing::debug!(user_id, count = summaries.len(), "Listed conversations");
        Ok(summaries)
    }

    /// Rename a group. Only its participants may do so.
    pub async fn rename(&self, conversation_id: i64, actor_id: i64, new_name: &str) -> AppResult<Conversation> {
        let mut tx = begin_write(&self.db).await?;
        require_group(&mut tx, conversation_id).await?;
        require_participant(&mut tx, conversation_id, actor_id).await?;

        sqlx::query("UPDATE conversations SET name = ?, updated_at = ? WHERE id = ?")
            .bind(new_name)
            .bind(now())
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        let conversation = load(&mut tx, conversation_id).await?;
        tx.commit().await?;

        tracing::info!(conversation_id, actor_id, "Group renamed");
        Ok(conversation)
    }

    /// Replace a group's photo with a base64 wire payload.
    pub async fn set_photo(&self, conversation_id: i64, actor_id: i64, encoded: &str) -> AppResult<Conversation> {
        let mut tx = begin_write(&self.db).await?;
        require_group(&mut tx, conversation_id).await?;
        require_participant(&mut tx, conversation_id, actor_id).await?;
        let photo = Photo::from_base64(encoded)?;

        sqlx::query("UPDATE conversations SET convo_pic = ?, updated_at = ? WHERE id = ?")
            .bind(photo.as_bytes())
            .bind(now())
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        let conversation = load(&mut tx, conversation_id).await?;
        tx.commit().await?;

        tracing::info!(conversation_id, actor_id, "Group photo updated");
        Ok(conversation)
    }
}

/// Assemble a conversation with participants and messages. Not a snapshot:
/// a message written mid-read may or may not be included.
pub(crate) async fn load(conn: &mut SqliteConnection, conversation_id: i64) -> AppResult<Conversation> {
    let row = sqlx::query_as::<_, ConversationRow>(
        "SELECT id, kind, name, convo_pic FROM conversations WHERE id = ?",
    )
    .bind(conversation_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?;

    let participants = participants(&mut *conn, conversation_id).await?;
    let messages = messages::for_conversation(&mut *conn, conversation_id).await?;

    Ok(Conversation {
        id: row.id,
        kind: row.kind,
        name: row.name,
        participants,
        convo_pic: row.convo_pic.map(Photo::from_stored),
        messages,
    })
}

async fn participants(conn: &mut SqliteConnection, conversation_id: i64) -> AppResult<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"SELECT u.username FROM users u
           INNER JOIN conversation_participants cp ON cp.user_id = u.id
           WHERE cp.conversation_id = ?
           ORDER BY u.username ASC"#,
    )
    .bind(conversation_id)
    .fetch_all(conn)
    .await?;

    Ok(names)
}
