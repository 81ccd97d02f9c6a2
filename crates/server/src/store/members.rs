use sqlx::SqlitePool;

use super::conversations::load;
use super::{begin_write, now, require_group, require_participant};
use crate::error::{AppError, AppResult};
use crate::models::Conversation;

/// Adds and removes participants of group conversations.
#[derive(Clone)]
pub struct MembershipManager {
    db: SqlitePool,
}

impl MembershipManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Add users by name, best effort: unknown usernames are skipped and
    /// existing members are left alone. The actor must already be a member.
    pub async fn add_members(
        &self,
        conversation_id: i64,
        actor_id: i64,
        usernames: &[String],
    ) -> AppResult<Conversation> {
        let mut tx = begin_write(&self.db).await?;
        require_group(&mut tx, conversation_id).await?;
        require_participant(&mut tx, conversation_id, actor_id).await?;

        let now = now();
        let mut added = 0u64;
        for username in usernames {
            let user_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&mut *tx)
                .await?;

            let Some(user_id) = user_id else {
                tracing::warn!(conversation_id, username = %username, "Skipping unknown username");
                continue;
            };

            added += sqlx::query(
                "INSERT OR IGNORE INTO conversation_participants (conversation_id, user_id, joined_at) VALUES (?, ?, ?)",
            )
            .bind(conversation_id)
            .bind(user_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        let conversation = load(&mut tx, conversation_id).await?;
        tx.commit().await?;

        tracing::info!(conversation_id, actor_id, added, "Members added");
        Ok(conversation)
    }

    /// Remove `user_id` from a group. A group left with no participants is kept.
    pub async fn remove_member(&self, conversation_id: i64, user_id: i64) -> AppResult<()> {
        let mut tx = begin_write(&self.db).await?;
        require_group(&mut tx, conversation_id).await?;

        let removed = sqlx::query(
            "DELETE FROM conversation_participants WHERE conversation_id = ? AND user_id = ?",
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            return Err(AppError::NotFound("User not member of group".into()));
        }

        tx.commit().await?;

        tracing::info!(conversation_id, user_id, "Member removed");
        Ok(())
    }
}
