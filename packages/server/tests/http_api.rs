//! HTTP API integration tests.
//!
//! Tests for the health check, stats and push endpoints.

mod fixtures;

use fixtures::{TestServer, recv_event};
use leasewire_server::ui::PUSH_SECRET_HEADER;
use leasewire_shared::ServerEvent;
use serde_json::json;

fn deleted_push() -> serde_json::Value {
    json!({
        "kind": "messageDeleted",
        "payload": {"conversationId": "42", "messageId": "m-1"}
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    // テスト項目: /api/health エンドポイントが正常に動作する
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = reqwest::get(format!("{}/api/health", server.base_url()))
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_stats_counts_connections_and_mailboxes() {
    // テスト項目: /api/stats が接続数とルーム数 (メールボックス含む) を返す
    // given (前提条件):
    let server = TestServer::start().await;
    let _tab1 = server.connect("alice").await;
    let _tab2 = server.connect("alice").await;
    let _bob = server.connect("bob").await;

    // when (操作):
    let stats = server.stats().await;

    // then (期待する結果):
    assert_eq!(stats["active_connections"], 3);
    assert_eq!(stats["active_rooms"], 2);
}

#[tokio::test]
async fn test_push_to_empty_room_delivers_zero() {
    // テスト項目: メンバーのいないルームへの push は 200 / delivered=0
    let server = TestServer::start().await;

    let response = server.push(deleted_push()).await;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["delivered"], 0);
}

#[tokio::test]
async fn test_push_rejects_malformed_payload() {
    // テスト項目: 不正なペイロードは 422 となり配信されない
    // given (前提条件):
    let server = TestServer::start().await;
    let bodies = [
        json!({"kind": "messageDeleted", "payload": {"conversationId": "42", "messageId": ""}}),
        json!({"kind": "messageEdited", "payload": {}}),
        json!({"kind": "messageDeleted"}),
    ];

    for body in bodies {
        // when (操作):
        let response = server.push(body.clone()).await;

        // then (期待する結果):
        assert_eq!(response.status(), 422, "body: {body}");
        let error: serde_json::Value = response.json().await.unwrap();
        assert!(error["error"].is_string());
    }
}

#[tokio::test]
async fn test_push_requires_configured_secret() {
    // テスト項目: push secret 設定時、ヘッダーが無い・誤っている場合は 401
    // given (前提条件):
    let server = TestServer::start_with_secret(Some("s3cret")).await;
    let client = reqwest::Client::new();
    let url = format!("{}/internal/push", server.base_url());

    // when (操作):
    let missing = client.post(&url).json(&deleted_push()).send().await.unwrap();
    let wrong = client
        .post(&url)
        .header(PUSH_SECRET_HEADER, "guess")
        .json(&deleted_push())
        .send()
        .await
        .unwrap();
    let correct = client
        .post(&url)
        .header(PUSH_SECRET_HEADER, "s3cret")
        .json(&deleted_push())
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(missing.status(), 401);
    assert_eq!(wrong.status(), 401);
    assert_eq!(correct.status(), 200);
}

#[tokio::test]
async fn test_push_conversation_created_dedupes_participants() {
    // テスト項目: participantIds が重複しても 1 接続に 1 回だけ届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut tenant = server.connect("t-1").await;

    // when (操作):
    let response = server
        .push(json!({
            "kind": "conversationCreated",
            "participantIds": ["t-1", "t-1"],
            "payload": {
                "id": "c-1",
                "type": "LANDLORD_TENANT",
                "participants": [{"id": "t-1", "name": "Dana", "type": "TENANT"}],
                "createdAt": "2024-05-01T09:30:00Z"
            }
        }))
        .await;

    // then (期待する結果):
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["delivered"], 1);
    match recv_event(&mut tenant).await {
        ServerEvent::ConversationCreated(payload) => assert_eq!(payload.id, "c-1"),
        other => panic!("Expected conversation:created, got {other:?}"),
    }
    fixtures::assert_silent(&mut tenant).await;
}
