use serde::{Deserialize, Serialize};

use super::Photo;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub pic: Photo,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub pic: Vec<u8>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            pic: Photo::from_stored(row.pic),
        }
    }
}

/// Body of `POST /session`.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub identifier: String,
    pub username: String,
    pub pic: Photo,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SetUsernameRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SetUserPhotoRequest {
    pub pic: String,
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub q: Option<String>,
}
