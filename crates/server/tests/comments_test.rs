mod common;

use axum::http::StatusCode;
use serde_json::json;

fn comments_path(conversation_id: i64, message_id: i64) -> String {
    format!("/conversations/{}/messages/{}/comments", conversation_id, message_id)
}

async fn comment(server: &axum_test::TestServer, token: &str, path: &str, text: &str) -> axum_test::TestResponse {
    let (h, v) = common::auth_header(token);
    server
        .post(path)
        .add_header(h, v)
        .json(&json!({ "text": text }))
        .await
}

async fn conversation_message(
    server: &axum_test::TestServer,
    token: &str,
    conversation_id: i64,
) -> serde_json::Value {
    let (h, v) = common::auth_header(token);
    let body: serde_json::Value = server
        .get(&format!("/conversations/{}", conversation_id))
        .add_header(h, v)
        .await
        .json();
    body["messages"][0].clone()
}

#[tokio::test]
async fn comment_then_remove() {
    let (server, pool) = common::setup().await;
    let (_, alice) = common::create_test_user(&pool, "alice").await;
    let (_, bob) = common::create_test_user(&pool, "bob").await;
    let id = common::start_direct(&server, &alice, "bob").await;
    let message = common::send_text(&server, &alice, id, "hi").await;
    let path = comments_path(id, message);

    let res = comment(&server, &bob, &path, "nice").await;
    res.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = res.json();
    assert_eq!(body["message_id"], message);
    assert_eq!(body["username"], "bob");
    assert_eq!(body["text"], "nice");

    let shown = conversation_message(&server, &alice, id).await;
    assert_eq!(shown["comments_count"], 1);
    assert_eq!(shown["comments_authors"], json!(["bob"]));

    let comment_id = body["id"].as_i64().unwrap();
    let (h, v) = common::auth_header(&bob);
    server
        .delete(&format!("{}/{}", path, comment_id))
        .add_header(h, v)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let shown = conversation_message(&server, &alice, id).await;
    assert_eq!(shown["comments_count"], 0);
    assert_eq!(shown["comments_authors"], json!([]));

    let (h, v) = common::auth_header(&bob);
    server
        .delete(&format!("{}/{}", path, comment_id))
        .add_header(h, v)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn remove_takes_all_of_an_authors_comments() {
    let (server, pool) = common::setup().await;
    let (_, alice) = common::create_test_user(&pool, "alice").await;
    let (_, bob) = common::create_test_user(&pool, "bob").await;
    let id = common::start_direct(&server, &alice, "bob").await;
    let message = common::send_text(&server, &alice, id, "hi").await;
    let path = comments_path(id, message);

    comment(&server, &bob, &path, "one").await.assert_status(StatusCode::CREATED);
    comment(&server, &bob, &path, "two").await.assert_status(StatusCode::CREATED);
    comment(&server, &alice, &path, "thanks").await.assert_status(StatusCode::CREATED);

    let shown = conversation_message(&server, &alice, id).await;
    assert_eq!(shown["comments_count"], 3);
    assert_eq!(shown["comments_authors"], json!(["alice", "bob"]));

    let (h, v) = common::auth_header(&bob);
    server
        .delete(&format!("{}/0", path))
        .add_header(h, v)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let shown = conversation_message(&server, &alice, id).await;
    assert_eq!(shown["comments_count"], 1);
    assert_eq!(shown["comments_authors"], json!(["alice"]));
}

#[tokio::test]
async fn list_returns_oldest_first() {
    let (server, pool) = common::setup().await;
    let (_, alice) = common::create_test_user(&pool, "alice").await;
    let (_, bob) = common::create_test_user(&pool, "bob").await;
    let id = common::start_direct(&server, &alice, "bob").await;
    let message = common::send_text(&server, &alice, id, "hi").await;
    let path = comments_path(id, message);

    comment(&server, &bob, &path, "first").await.assert_status(StatusCode::CREATED);
    comment(&server, &alice, &path, "second").await.assert_status(StatusCode::CREATED);

    let (h, v) = common::auth_header(&alice);
    let res = server.get(&path).add_header(h, v).await;
    res.assert_status_ok();

    let body: Vec<serde_json::Value> = res.json();
    let texts: Vec<&str> = body.iter().map(|c| c["text"].as_str().unwrap()).collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(body[0]["username"], "bob");
}

#[tokio::test]
async fn blank_comment_is_rejected() {
    let (server, pool) = common::setup().await;
    let (_, alice) = common::create_test_user(&pool, "alice").await;
    common::create_test_user(&pool, "bob").await;
    let id = common::start_direct(&server, &alice, "bob").await;
    let message = common::send_text(&server, &alice, id, "hi").await;

    comment(&server, &alice, &comments_path(id, message), "  ")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn message_must_belong_to_conversation() {
    let (server, pool) = common::setup().await;
    let (_, alice) = common::create_test_user(&pool, "alice").await;
    common::create_test_user(&pool, "bob").await;
    common::create_test_user(&pool, "carol").await;
    let with_bob = common::start_direct(&server, &alice, "bob").await;
    let with_carol = common::start_direct(&server, &alice, "carol").await;
    let message = common::send_text(&server, &alice, with_bob, "hi").await;

    comment(&server, &alice, &comments_path(with_carol, message), "wrong place")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    comment(&server, &alice, &comments_path(with_bob, 9999), "nothing here")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn outsider_cannot_comment_or_list() {
    let (server, pool) = common::setup().await;
    let (_, alice) = common::create_test_user(&pool, "alice").await;
    common::create_test_user(&pool, "bob").await;
    let (_, eve) = common::create_test_user(&pool, "eve").await;
    let id = common::start_direct(&server, &alice, "bob").await;
    let message = common::send_text(&server, &alice, id, "hi").await;
    let path = comments_path(id, message);

    comment(&server, &eve, &path, "hello").await.assert_status(StatusCode::FORBIDDEN);

    let (h, v) = common::auth_header(&eve);
    server.get(&path).add_header(h, v).await.assert_status(StatusCode::FORBIDDEN);
}
