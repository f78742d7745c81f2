// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use axum_test::TestServer;
use enrichrs::domain::models::badge::Badge;
use enrichrs::domain::models::message::{HostMessage, InboundMessage, PageMessage};
use enrichrs::domain::services::session_service::SessionBridge;
use enrichrs::domain::services::status_indicator::StatusIndicator;
use enrichrs::infrastructure::status::badge_store::BadgeStore;
use enrichrs::presentation::routes;
use enrichrs::presentation::state::BridgeState;
use enrichrs::queue::queue_manager::{QueuePhase, QueueSnapshot};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

struct TestBridge {
    server: TestServer,
    inbound: mpsc::UnboundedReceiver<InboundMessage>,
    session: SessionBridge,
    badge: Arc<BadgeStore>,
    snapshot: Arc<RwLock<QueueSnapshot>>,
}

fn create_bridge(jwt_secret: Option<String>) -> TestBridge {
    let (inbound_tx, inbound) = mpsc::unbounded_channel();
    let session = SessionBridge::new(jwt_secret);
    let badge = Arc::new(BadgeStore::new());
    let snapshot = Arc::new(RwLock::new(QueueSnapshot {
        phase: QueuePhase::Idle,
        active_task: None,
        backlog: vec![],
    }));

    let state = BridgeState {
        inbound: inbound_tx,
        session: session.clone(),
        indicator: badge.clone(),
        snapshot: snapshot.clone(),
    };
    let server = TestServer::new(routes::routes(state)).expect("Failed to create test server");

    TestBridge {
        server,
        inbound,
        session,
        badge,
        snapshot,
    }
}

/// 测试健康检查与版本端点
#[tokio::test]
async fn test_health_and_version() {
    let bridge = create_bridge(None);

    bridge.server.get("/health").await.assert_text("OK");
    bridge
        .server
        .get("/v1/version")
        .await
        .assert_text(env!("CARGO_PKG_VERSION"));
}

/// 测试 SET_TOKEN 建立会话并转发给工作器
#[tokio::test]
async fn test_set_token_is_forwarded() {
    let mut bridge = create_bridge(None);
    let user_id = Uuid::new_v4();

    let response = bridge
        .server
        .post("/v1/messages")
        .json(&json!({"type": "SET_TOKEN", "token": "opaque", "userId": user_id}))
        .await;

    response.assert_status(StatusCode::ACCEPTED);
    assert_eq!(bridge.session.current_user(), Some(user_id));
    assert_eq!(
        bridge.inbound.try_recv().unwrap(),
        InboundMessage::Host(HostMessage::SetToken {
            token: "opaque".to_string(),
            user_id
        })
    );
}

/// 测试被拒绝的令牌返回 401 且不转发
#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let mut bridge = create_bridge(Some("secret".to_string()));

    let response = bridge
        .server
        .post("/v1/messages")
        .json(&json!({"type": "SET_TOKEN", "token": "not-a-jwt", "userId": Uuid::new_v4()}))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(bridge.session.current_user().is_none());
    assert!(bridge.inbound.try_recv().is_err());
}

/// 测试内容脚本结果被转发
#[tokio::test]
async fn test_scraped_data_is_forwarded() {
    let mut bridge = create_bridge(None);
    let task_id = Uuid::new_v4();

    bridge
        .server
        .post("/v1/messages")
        .json(&json!({
            "action": "scrapedData",
            "taskId": task_id,
            "contacts": [{"name": "Jane Doe", "title": "CTO"}]
        }))
        .await
        .assert_status(StatusCode::ACCEPTED);

    match bridge.inbound.try_recv().unwrap() {
        InboundMessage::Page(PageMessage::ScrapedData {
            task_id: id,
            contacts: Some(contacts),
            ..
        }) => {
            assert_eq!(id, task_id);
            assert_eq!(contacts[0].name, "Jane Doe");
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

/// 测试未知消息被拒绝
#[tokio::test]
async fn test_unknown_message_is_rejected() {
    let mut bridge = create_bridge(None);

    let response = bridge
        .server
        .post("/v1/messages")
        .json(&json!({"type": "OPEN_POPUP"}))
        .await;

    assert!(response.status_code().is_client_error());
    assert!(bridge.inbound.try_recv().is_err());
}

/// 测试工作器停止后返回 503
#[tokio::test]
async fn test_stopped_worker_is_unavailable() {
    let bridge = create_bridge(None);
    let TestBridge {
        server, inbound, ..
    } = bridge;
    drop(inbound);

    let response = server
        .post("/v1/messages")
        .json(&json!({"type": "SCRAPE_COMPANY_PAGE", "opportunityId": Uuid::new_v4()}))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["error"], "enrichment worker is not running");
}

/// 测试状态端点
#[tokio::test]
async fn test_status_reports_badge_queue_and_session() {
    let bridge = create_bridge(None);
    let user_id = Uuid::new_v4();
    let active = Uuid::new_v4();
    let queued = Uuid::new_v4();

    bridge.session.set_token("opaque".to_string(), user_id).unwrap();
    bridge.badge.set(Badge::Running);
    *bridge.snapshot.write() = QueueSnapshot {
        phase: QueuePhase::Dispatching,
        active_task: Some(active),
        backlog: vec![queued],
    };

    let body: Value = bridge.server.get("/v1/status").await.json();

    assert_eq!(body["badge"], "RUN");
    assert_eq!(body["phase"], "dispatching");
    assert_eq!(body["active_task"], json!(active));
    assert_eq!(body["backlog"], json!([queued]));
    assert_eq!(body["user_id"], json!(user_id));
}
