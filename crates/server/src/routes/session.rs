use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{LoginRequest, LoginResponse};
use crate::AppState;

/// POST /session
///
/// Logs in as `username`, registering it first if nobody holds it yet. The
/// returned identifier is what clients send back as their bearer token.
pub async fn do_login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let (user, created) = state.users.register_or_login(body.username.trim()).await?;

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(LoginResponse {
            identifier: user.id.to_string(),
            username: user.username,
            pic: user.pic,
        }),
    ))
}

/// GET /liveness
pub async fn liveness(State(state): State<Arc<AppState>>) -> AppResult<StatusCode> {
    sqlx::query("SELECT 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
