#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::TestServer;
use parley_server::{config, config::Config, db, routes, AppState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

/// Create an in-memory SQLite pool with schema applied.
pub async fn setup_test_db() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");

    db::apply_schema(&pool).await.unwrap();
    pool
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        database_path: ":memory:".into(),
        default_photo: config::builtin_default_photo().unwrap(),
    }
}

pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState::new(pool, test_config()))
}

/// Build a test Axum app with the given pool.
pub fn create_test_app(pool: SqlitePool) -> Router {
    routes::build_router(create_test_state(pool))
}

pub async fn setup() -> (TestServer, SqlitePool) {
    let pool = setup_test_db().await;
    let app = create_test_app(pool.clone());
    let server = TestServer::new(app).unwrap();
    (server, pool)
}

pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        format!("Bearer {}", token).parse().unwrap(),
    )
}

/// Create a test user directly in the database. Returns (user_id, bearer token).
pub async fn create_test_user(pool: &SqlitePool, username: &str) -> (i64, String) {
    let now = chrono::Utc::now().to_rfc3339();
    let photo = config::builtin_default_photo().unwrap();

    let user_id = sqlx::query(
        "INSERT INTO users (username, pic, created_at, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(username)
    .bind(photo.as_bytes())
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid();

    (user_id, user_id.to_string())
}

/// Start a direct conversation over HTTP and return its id.
pub async fn start_direct(server: &TestServer, token: &str, recipient: &str) -> i64 {
    let (h, v) = auth_header(token);
    let res = server
        .post("/conversations")
        .add_header(h, v)
        .json(&serde_json::json!({ "recipient": recipient }))
        .await;
    res.assert_status(axum::http::StatusCode::CREATED);
    res.json::<serde_json::Value>()["id"].as_i64().unwrap()
}

/// Create a group over HTTP and return its id.
pub async fn create_group(server: &TestServer, token: &str, name: &str) -> i64 {
    let (h, v) = auth_header(token);
    let res = server
        .post("/groups")
        .add_header(h, v)
        .json(&serde_json::json!({ "name": name }))
        .await;
    res.assert_status(axum::http::StatusCode::CREATED);
    res.json::<serde_json::Value>()["id"].as_i64().unwrap()
}

/// Send a text message over HTTP and return its id.
pub async fn send_text(server: &TestServer, token: &str, conversation_id: i64, text: &str) -> i64 {
    let (h, v) = auth_header(token);
    let res = server
        .post(&format!("/conversations/{}/messages", conversation_id))
        .add_header(h, v)
        .json(&serde_json::json!({ "type": "text", "text": text }))
        .await;
    res.assert_status(axum::http::StatusCode::CREATED);
    res.json::<serde_json::Value>()["id"].as_i64().unwrap()
}
