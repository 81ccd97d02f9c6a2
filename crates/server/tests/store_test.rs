mod common;

use parley_server::error::AppError;
use parley_server::models::NewMessage;
use parley_server::{db, AppState};
use std::path::PathBuf;

fn temp_db_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("parley-{}-{}.db", name, std::process::id()))
}

fn remove_db_files(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        std::fs::remove_file(file).ok();
    }
}

#[tokio::test]
async fn concurrent_start_direct_yields_one_conversation() {
    let path = temp_db_path("concurrent-direct");
    remove_db_files(&path);

    let pool = db::init_pool(path.to_str().unwrap()).await.unwrap();
    let state = AppState::new(pool.clone(), common::test_config());

    let (alice, _) = state.users.register_or_login("alice").await.unwrap();
    let (bob, _) = state.users.register_or_login("bob").await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let registry = state.conversations.clone();
        let (initiator, recipient) = if i % 2 == 0 {
            (alice.id, "bob")
        } else {
            (bob.id, "alice")
        };
        handles.push(tokio::spawn(async move {
            registry.start_direct(initiator, recipient).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 1);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    pool.close().await;
    remove_db_files(&path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_and_sends_on_one_group_all_succeed() {
    let path = temp_db_path("concurrent-group");
    remove_db_files(&path);

    let pool = db::init_pool(path.to_str().unwrap()).await.unwrap();
    let state = AppState::new(pool.clone(), common::test_config());

    let (owner, _) = state.users.register_or_login("owner").await.unwrap();
    let group = state.conversations.create_group(owner.id, "Crowd").await.unwrap();

    let mut usernames = Vec::new();
    for i in 0..40 {
        let name = format!("user{:02}", i);
        state.users.register_or_login(&name).await.unwrap();
        usernames.push(name);
    }

    let mut handles = Vec::new();
    for (i, name) in usernames.into_iter().enumerate() {
        let members = state.members.clone();
        handles.push(tokio::spawn(async move {
            members
                .add_members(group.id, owner.id, &[name])
                .await
                .map(|_| ())
        }));

        let messages = state.messages.clone();
        handles.push(tokio::spawn(async move {
            let message = NewMessage {
                kind: "text".into(),
                text: Some(format!("message {}", i)),
                photo: None,
            };
            messages.send(group.id, owner.id, &message).await.map(|_| ())
        }));
    }

    let mut failures = Vec::new();
    for handle in handles {
        if let Err(err) = handle.await.unwrap() {
            failures.push(format!("{:?}", err));
        }
    }
    assert!(failures.is_empty(), "failed operations: {:?}", failures);

    let members: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM conversation_participants WHERE conversation_id = ?")
            .bind(group.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(members, 41);

    let messages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = ?")
        .bind(group.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(messages, 40);

    pool.close().await;
    remove_db_files(&path);
}

#[tokio::test]
async fn removed_member_can_no_longer_post_or_comment() {
    let pool = common::setup_test_db().await;
    let state = common::create_test_state(pool);

    let (owner, _) = state.users.register_or_login("owner").await.unwrap();
    let (guest, _) = state.users.register_or_login("guest").await.unwrap();
    let group = state.conversations.create_group(owner.id, "Club").await.unwrap();
    state
        .members
        .add_members(group.id, owner.id, &["guest".to_string()])
        .await
        .unwrap();

    let hello = NewMessage {
        kind: "text".into(),
        text: Some("hello".into()),
        photo: None,
    };
    let message = state.messages.send(group.id, guest.id, &hello).await.unwrap();

    state.members.remove_member(group.id, guest.id).await.unwrap();

    assert!(matches!(
        state.messages.send(group.id, guest.id, &hello).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        state.comments.add(message.id, group.id, guest.id, "still here?").await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn register_or_login_reports_creation_once() {
    let pool = common::setup_test_db().await;
    let state = common::create_test_state(pool);

    let (first, created) = state.users.register_or_login("alice").await.unwrap();
    assert!(created);
    assert_eq!(first.pic, state.config.default_photo);

    let (second, created) = state.users.register_or_login("alice").await.unwrap();
    assert!(!created);
    assert_eq!(first.id, second.id);

    let found = state.users.get_by_username("alice").await.unwrap();
    assert_eq!(found.id, first.id);
    assert!(matches!(
        state.users.get_by_username("nobody").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn conversation_get_checks_membership_before_existence() {
    let pool = common::setup_test_db().await;
    let state = common::create_test_state(pool);
    let (alice, _) = state.users.register_or_login("alice").await.unwrap();

    assert!(matches!(
        state.conversations.get(42, alice.id).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn comment_authors_preview_is_capped_and_most_recent_first() {
    let pool = common::setup_test_db().await;
    let state = common::create_test_state(pool);

    let (owner, _) = state.users.register_or_login("owner").await.unwrap();
    let group = state.conversations.create_group(owner.id, "Club").await.unwrap();

    let names = ["ann", "ben", "cat", "dan"];
    let mut ids = Vec::new();
    for name in names {
        let (user, _) = state.users.register_or_login(name).await.unwrap();
        ids.push(user.id);
    }
    let usernames: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    state.members.add_members(group.id, owner.id, &usernames).await.unwrap();

    let message = state
        .messages
        .send(
            group.id,
            owner.id,
            &NewMessage {
                kind: "text".into(),
                text: Some("vote".into()),
                photo: None,
            },
        )
        .await
        .unwrap();

    for id in &ids {
        state.comments.add(message.id, group.id, *id, "+1").await.unwrap();
    }
    // ann comments again, moving her to the front
    state.comments.add(message.id, group.id, ids[0], "+1 again").await.unwrap();

    let conversation = state.conversations.get(group.id, owner.id).await.unwrap();
    let shown = &conversation.messages[0];
    assert_eq!(shown.comments_count, 5);
    assert_eq!(shown.comments_authors, vec!["ann", "dan", "cat"]);

    let listed = state.comments.list(message.id, group.id, owner.id).await.unwrap();
    assert_eq!(listed.len(), 5);
    assert_eq!(listed[0].author, "ann");
    assert_eq!(listed[4].text, "+1 again");
}
