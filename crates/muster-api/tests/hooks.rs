//! Integration tests for the trigger hook endpoints.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use muster_api::{router, AppState, Config};
use muster_core::{DocPath, DocumentStore, GroupId, MemoryStore, UserId, WriteOp};
use muster_push::{MemoryTransport, PushTransport};
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    transport: Arc<MemoryTransport>,
}

fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let transport = Arc::new(MemoryTransport::new());
    let state = AppState::new(
        Config::default(),
        Arc::clone(&store) as Arc<dyn DocumentStore>,
        Arc::clone(&transport) as Arc<dyn PushTransport>,
    );
    TestApp {
        router: router(state),
        store,
        transport,
    }
}

async fn seed(store: &MemoryStore, path: DocPath, doc: Value) {
    let Value::Object(fields) = doc else {
        panic!("seed must be an object");
    };
    store
        .commit(vec![WriteOp::Merge { path, fields }])
        .await
        .unwrap();
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let parsed = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, parsed)
}

fn group(raw: &str) -> GroupId {
    GroupId::new(raw).unwrap()
}

async fn used_bytes(store: &MemoryStore, id: &str) -> Option<u64> {
    store
        .get(&DocPath::group_storage_stats(&group(id)))
        .await
        .unwrap()
        .and_then(|doc| doc.u64_field("storageUsedBytes"))
}

#[tokio::test]
async fn group_created_hook_seeds_stats() {
    let app = test_app();

    let (status, body) = post_json(
        &app.router,
        "/v1/hooks/groups/created",
        json!({"groupId": "g1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handled"], json!(true));

    let stats = app
        .store
        .get(&DocPath::group_storage_stats(&group("g1")))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stats.u64_field("storageUsedBytes"), Some(0));
    assert_eq!(
        stats.u64_field("storageQuotaBytes"),
        Some(muster_groups::DEFAULT_STORAGE_QUOTA_BYTES)
    );
}

#[tokio::test]
async fn group_created_hook_rejects_malformed_events() {
    let app = test_app();
    let (status, body) = post_json(&app.router, "/v1/hooks/groups/created", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("INVALID_ARGUMENT"));
}

#[tokio::test]
async fn chat_hook_notifies_everyone_but_sender_and_honoree() {
    let app = test_app();
    seed(
        &app.store,
        DocPath::group(&group("g1")),
        json!({"members": ["sender", "peer", "vip"]}),
    )
    .await;
    seed(
        &app.store,
        DocPath::user(&UserId::new("sender").unwrap()),
        json!({"activeTokens": ["ts"], "groupId": "g1"}),
    )
    .await;
    seed(
        &app.store,
        DocPath::user(&UserId::new("peer").unwrap()),
        json!({"activeTokens": ["tp"], "groupId": "g1"}),
    )
    .await;
    seed(
        &app.store,
        DocPath::user(&UserId::new("vip").unwrap()),
        json!({"activeTokens": ["tv"], "groupId": "g1", "role": "honoree"}),
    )
    .await;

    let (status, body) = post_json(
        &app.router,
        "/v1/hooks/chat/message-created",
        json!({"groupId": "g1", "senderId": "sender", "text": "brunch at ten"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], json!(1));

    let sends = app.transport.sends();
    assert_eq!(sends.len(), 1);
    let tokens: Vec<&str> = sends[0].tokens.iter().map(AsRef::as_ref).collect();
    assert_eq!(tokens, vec!["tp"]);
    assert_eq!(sends[0].message.body, "brunch at ten");
}

#[tokio::test]
async fn chat_hook_for_unknown_group_is_a_silent_no_op() {
    let app = test_app();
    let (status, body) = post_json(
        &app.router,
        "/v1/hooks/chat/message-created",
        json!({"groupId": "gone", "senderId": "s", "text": "hello"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], json!(0));
    assert!(app.transport.sends().is_empty());
}

#[tokio::test]
async fn chat_hook_truncates_long_messages() {
    let app = test_app();
    seed(
        &app.store,
        DocPath::group(&group("g1")),
        json!({"members": ["s", "r"]}),
    )
    .await;
    seed(
        &app.store,
        DocPath::user(&UserId::new("r").unwrap()),
        json!({"activeTokens": ["tr"]}),
    )
    .await;

    let long = "x".repeat(200);
    let (status, _) = post_json(
        &app.router,
        "/v1/hooks/chat/message-created",
        json!({"groupId": "g1", "senderId": "s", "text": long}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let sends = app.transport.sends();
    let body = &sends[0].message.body;
    assert_eq!(body.chars().count(), 81);
    assert!(body.ends_with('\u{2026}'));
}

#[tokio::test]
async fn storage_hooks_drive_the_counter() {
    let app = test_app();

    let (status, body) = post_json(
        &app.router,
        "/v1/hooks/storage/object-finalized",
        json!({"objectPath": "uploads/groups/g1/bases/a.jpg", "sizeBytes": 100}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handled"], json!(true));
    assert_eq!(used_bytes(&app.store, "g1").await, Some(100));

    post_json(
        &app.router,
        "/v1/hooks/storage/object-finalized",
        json!({"objectPath": "uploads/groups/g1/bases/b.jpg", "sizeBytes": 50}),
    )
    .await;
    post_json(
        &app.router,
        "/v1/hooks/storage/object-deleted",
        json!({"objectPath": "uploads/groups/g1/bases/a.jpg", "sizeBytes": 100}),
    )
    .await;
    assert_eq!(used_bytes(&app.store, "g1").await, Some(50));

    // Duplicate delete: floors at zero instead of going negative.
    post_json(
        &app.router,
        "/v1/hooks/storage/object-deleted",
        json!({"objectPath": "uploads/groups/g1/bases/a.jpg", "sizeBytes": 100}),
    )
    .await;
    assert_eq!(used_bytes(&app.store, "g1").await, Some(0));
}

#[tokio::test]
async fn storage_hooks_ignore_unrelated_objects() {
    let app = test_app();

    let (status, body) = post_json(
        &app.router,
        "/v1/hooks/storage/object-finalized",
        json!({"objectPath": "misc/file.jpg", "sizeBytes": 100}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handled"], json!(false));

    let (_, body) = post_json(
        &app.router,
        "/v1/hooks/storage/object-finalized",
        json!({"objectPath": "uploads/groups/g1/bases/a.jpg", "sizeBytes": 0}),
    )
    .await;
    assert_eq!(body["handled"], json!(false));
    assert_eq!(used_bytes(&app.store, "g1").await, None);
}

#[tokio::test]
async fn storage_hooks_absorb_events_without_a_path() {
    let app = test_app();
    let (status, body) = post_json(
        &app.router,
        "/v1/hooks/storage/object-deleted",
        json!({"sizeBytes": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handled"], json!(false));
}
