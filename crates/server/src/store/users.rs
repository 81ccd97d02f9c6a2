use parley_shared::constants::USER_SEARCH_LIMIT;
use parley_shared::validation::validate_username;
use sqlx::SqlitePool;

use super::now;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::{Photo, User, UserRow};

/// User records and username uniqueness.
#[derive(Clone)]
pub struct UserDirectory {
    db: SqlitePool,
    default_photo: Photo,
}

impl UserDirectory {
    pub fn new(db: SqlitePool, default_photo: Photo) -> Self {
        Self { db, default_photo }
    }

    /// Returns the user named `username`, creating it with the default photo
    /// on first sight. The flag is `true` when the account was just created.
    pub async fn register_or_login(&self, username: &str) -> AppResult<(User, bool)> {
        validate_username(username).map_err(AppError::Validation)?;

        let now = now();
        let inserted = sqlx::query(
            "INSERT INTO users (username, pic, created_at, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(username) DO NOTHING",
        )
        .bind(username)
        .bind(self.default_photo.as_bytes())
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        let created = inserted.rows_affected() == 1;
        let user = self.get_by_username(username).await?;

        if created {
            tracing::info!(user_id = user.id, username = %user.username, "New user registered");
        } else {
            tracing::debug!(user_id = user.id, "Existing user logged in");
        }

        Ok((user, created))
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, UserRow>("SELECT id, username, pic FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<User> {
        sqlx::query_as::<_, UserRow>("SELECT id, username, pic FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.db)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    /// Case-sensitive substring match, alphabetical. An empty query matches everyone.
    pub async fn search(&self, query: &str) -> AppResult<Vec<User>> {
        // instr() is case-sensitive where LIKE is not
        let users = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, pic FROM users WHERE instr(username, ?) > 0 ORDER BY username ASC LIMIT ?",
        )
        .bind(query)
        .bind(USER_SEARCH_LIMIT)
        .fetch_all(&self.db)
        .await?;

        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn rename(&self, id: i64, new_username: &str) -> AppResult<User> {
        validate_username(new_username).map_err(AppError::Validation)?;

        let owner = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
            .bind(new_username)
            .fetch_optional(&self.db)
            .await?;

        if let Some(owner_id) = owner {
            if owner_id != id {
                return Err(AppError::Conflict("Username already taken".into()));
            }
        }

        let result = sqlx::query("UPDATE users SET username = ?, updated_at = ? WHERE id = ?")
            .bind(new_username)
            .bind(now())
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|err| {
                // Lost a race with another rename to the same name
                if is_unique_violation(&err) {
                    AppError::Conflict("Username already taken".into())
                } else {
                    AppError::Internal(err)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }

        tracing::info!(user_id = id, username = %new_username, "Username updated");
        self.get_by_id(id).await
    }

    /// Replace the profile photo with a base64 wire payload.
    pub async fn set_photo(&self, id: i64, encoded: &str) -> AppResult<User> {
        let photo = Photo::from_base64(encoded)?;

        let result = sqlx::query("UPDATE users SET pic = ?, updated_at = ? WHERE id = ?")
            .bind(photo.as_bytes())
            .bind(now())
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }

        tracing::info!(user_id = id, "Profile photo updated");
        self.get_by_id(id).await
    }
}
