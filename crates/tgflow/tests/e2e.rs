// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests: gateway -> store -> dispatcher -> sender.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use tgflow_core::SenderAdapter;
use tgflow_gateway::{GatewayState, router};
use tgflow_queue::{Dispatcher, MessageQueue, QueueSettings};
use tgflow_test_utils::MockSender;

struct Harness {
    queue: Arc<MessageQueue>,
    sender: Arc<MockSender>,
    token: CancellationToken,
}

impl Harness {
    async fn start(settings: QueueSettings) -> Self {
        let queue = Arc::new(MessageQueue::new(settings));
        let sender = Arc::new(MockSender::new());
        let token = CancellationToken::new();
        let dispatcher = Dispatcher::new(
            Arc::clone(&queue),
            Arc::clone(&sender) as Arc<dyn SenderAdapter>,
            token.clone(),
        )
        .await;
        tokio::spawn(async move { dispatcher.run().await });
        Self {
            queue,
            sender,
            token,
        }
    }

    fn app(&self) -> Router {
        router(GatewayState::new(Arc::clone(&self.queue)))
    }

    async fn wait_for_sent(&self, count: usize) {
        for _ in 0..2000 {
            if self.queue.stats().await.sent >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("queue never reached {count} sent messages");
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn fast_settings() -> QueueSettings {
    let mut settings = QueueSettings::default();
    settings.send_interval_secs = 1;
    settings.random_delay = false;
    settings
}

async fn request(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.expect("request should complete");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, value)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

#[tokio::test(start_paused = true)]
async fn message_posted_to_gateway_is_delivered() {
    let harness = Harness::start(fast_settings()).await;

    let (status, body) = request(
        harness.app(),
        post(
            "/v1/queue/messages",
            json!({"recipient": "@alice", "content": "welcome"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_string());

    harness.wait_for_sent(1).await;
    assert_eq!(harness.sender.sent_recipients(), vec!["@alice"]);

    let (status, stats) = request(
        harness.app(),
        Request::builder()
            .uri("/v1/queue/stats")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["sent"], 1);
    assert_eq!(stats["sent_today"], 1);
    assert_eq!(stats["success_rate"], 100.0);
}

#[tokio::test(start_paused = true)]
async fn transient_failure_recovers_through_auto_retry() {
    let harness = Harness::start(fast_settings()).await;
    harness.sender.fail_next("connection timeout");

    let (status, _) = request(
        harness.app(),
        post(
            "/v1/queue/messages",
            json!({"recipient": "@flaky", "content": "hi"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    harness.wait_for_sent(1).await;
    assert_eq!(harness.sender.send_count(), 2);

    let messages = harness.queue.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].retry_count, 1);
}

#[tokio::test(start_paused = true)]
async fn pause_through_gateway_halts_dispatch() {
    let harness = Harness::start(fast_settings()).await;

    let (status, _) = request(harness.app(), post("/v1/queue/pause", json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        harness.app(),
        post(
            "/v1/queue/messages",
            json!({"recipient": "@held", "content": "wait"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(harness.sender.send_count(), 0);

    let (status, _) = request(harness.app(), post("/v1/queue/resume", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    harness.wait_for_sent(1).await;
}

#[tokio::test(start_paused = true)]
async fn priorities_decide_delivery_order_end_to_end() {
    let harness = Harness::start(fast_settings()).await;

    let (status, _) = request(
        harness.app(),
        post(
            "/v1/queue/messages/batch",
            json!({"messages": [
                {"recipient": "@bulk", "content": "promo", "priority": 5, "source": "batch"},
                {"recipient": "@vip", "content": "hello", "priority": 0},
            ]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    harness.wait_for_sent(2).await;
    assert_eq!(harness.sender.sent_recipients(), vec!["@vip", "@bulk"]);
}
