use parley_shared::constants::COMMENT_LIST_LIMIT;
use parley_shared::validation::validate_comment_text;
use sqlx::SqlitePool;

use super::{begin_write, message_in_conversation, now, require_participant};
use crate::error::{AppError, AppResult};
use crate::models::Comment;

/// Comments attached to messages.
///
/// An author may leave any number of comments on the same message; removal
/// takes all of them away at once.
#[derive(Clone)]
pub struct CommentStore {
    db: SqlitePool,
}

impl CommentStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn add(&self, message_id: i64, conversation_id: i64, author_id: i64, text: &str) -> AppResult<Comment> {
        let mut tx = begin_write(&self.db).await?;
        message_in_conversation(&mut tx, message_id, conversation_id).await?;
        require_participant(&mut tx, conversation_id, author_id).await?;
        validate_comment_text(text).map_err(AppError::Validation)?;

        let id = sqlx::query("INSERT INTO comments (message_id, author_id, text, created_at) VALUES (?, ?, ?, ?)")
            .bind(message_id)
            .bind(author_id)
            .bind(text)
            .bind(now())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        let comment = sqlx::query_as::<_, Comment>(
            r#"SELECT c.id, c.message_id, u.username AS author, c.text, c.created_at
               FROM comments c INNER JOIN users u ON u.id = c.author_id
               WHERE c.id = ?"#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(comment_id = id, message_id, author_id, "Comment added");
        Ok(comment)
    }

    /// Delete every comment `actor_id` left on the message.
    pub async fn remove(&self, message_id: i64, conversation_id: i64, actor_id: i64) -> AppResult<()> {
        let mut tx = begin_write(&self.db).await?;
        message_in_conversation(&mut tx, message_id, conversation_id).await?;
        require_participant(&mut tx, conversation_id, actor_id).await?;

        let removed = sqlx::query("DELETE FROM comments WHERE message_id = ? AND author_id = ?")
            .bind(message_id)
            .bind(actor_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            return Err(AppError::NotFound(
                "Comment not found or user is not the author".into(),
            ));
        }

        tx.commit().await?;

        tracing::info!(message_id, actor_id, removed, "Comments removed");
        Ok(())
    }

    /// Oldest first, capped.
    pub async fn list(&self, message_id: i64, conversation_id: i64, actor_id: i64) -> AppResult<Vec<Comment>> {
        let mut conn = self.db.acquire().await?;
        message_in_conversation(&mut conn, message_id, conversation_id).await?;
        require_participant(&mut conn, conversation_id, actor_id).await?;

        let comments = sqlx::query_as::<_, Comment>(
            r#"SELECT c.id, c.message_id, u.username AS author, c.text, c.created_at
               FROM comments c INNER JOIN users u ON u.id = c.author_id
               WHERE c.message_id = ?
               ORDER BY c.created_at ASC, c.id ASC
               LIMIT ?"#,
        )
        .bind(message_id)
        .bind(COMMENT_LIST_LIMIT)
        .fetch_all(&mut *conn)
        .await?;

        tracing::debug!(message_id, count = comments.len(), "Listed comments");
        Ok(comments)
    }
}
