use axum::{extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::AuthUser;
use crate::AppState;

/// `Authorization: Bearer <user id>`. The id is trusted as-is but must name
/// an existing user.
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Unauthorized("Authorization header required".into()))?;

        let user_id: i64 = bearer
            .token()
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid user identifier".into()))?;

        let user = state.users.get_by_id(user_id).await.map_err(|err| match err {
            AppError::NotFound(_) => AppError::Unauthorized("Invalid session".into()),
            other => other,
        })?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
        })
    }
}
