// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway API tests driven through the router without a socket.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use tgflow_core::{MessageStatus, NewMessage};
use tgflow_gateway::{GatewayState, router};
use tgflow_queue::{MessageQueue, QueueSettings};

fn app(queue: &Arc<MessageQueue>) -> Router {
    router(GatewayState::new(Arc::clone(queue)))
}

fn no_auto_retry_queue() -> Arc<MessageQueue> {
    let mut settings = QueueSettings::default();
    settings.auto_retry = false;
    Arc::new(MessageQueue::new(settings))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("request should complete");
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

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

#[tokio::test]
async fn health_reports_ok() {
    let queue = no_auto_retry_queue();
    let (status, body) = send(app(&queue), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn enqueue_then_stats_round_trip() {
    let queue = no_auto_retry_queue();
    let (status, body) = send(
        app(&queue),
        post_json(
            "/v1/queue/messages",
            json!({"recipient": "@alice", "content": "hi", "priority": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_string());

    let (status, stats) = send(app(&queue), get("/v1/queue/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["pending"], 1);
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["success_rate"], 100.0);
}

#[tokio::test]
async fn enqueue_rejects_empty_recipient() {
    let queue = no_auto_retry_queue();
    let (status, body) = send(
        app(&queue),
        post_json("/v1/queue/messages", json!({"recipient": " ", "content": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("recipient"));
}

#[tokio::test]
async fn batch_enqueue_returns_ids_in_order() {
    let queue = no_auto_retry_queue();
    let (status, body) = send(
        app(&queue),
        post_json(
            "/v1/queue/messages/batch",
            json!({"messages": [
                {"recipient": "@a", "content": "1"},
                {"recipient": "@b", "content": "2"},
            ]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ids"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        app(&queue),
        post_json("/v1/queue/messages/batch", json!({"messages": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("batch"));
}

#[tokio::test]
async fn list_messages_filters_by_status() {
    let queue = no_auto_retry_queue();
    let kept = queue.enqueue(NewMessage::new("@kept", "x")).await;
    let gone = queue.enqueue(NewMessage::new("@gone", "x")).await;
    assert!(queue.cancel(&gone).await);

    let (status, body) = send(app(&queue), get("/v1/queue/messages?status=pending")).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], json!(kept.0));

    let (status, body) = send(app(&queue), get("/v1/queue/messages?status=bogus")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("bogus"));
}

#[tokio::test]
async fn retry_unknown_id_is_404_wrong_status_is_409() {
    let queue = no_auto_retry_queue();
    let (status, _) = send(
        app(&queue),
        post_json("/v1/queue/messages/nope/retry", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let pending = queue.enqueue(NewMessage::new("@p", "x")).await;
    let (status, _) = send(
        app(&queue),
        post_json(&format!("/v1/queue/messages/{pending}/retry"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn retry_failed_message_returns_updated_message() {
    let queue = no_auto_retry_queue();
    let id = queue.enqueue(NewMessage::new("@f", "x")).await;
    assert!(queue.mark_sending(&id).await);
    assert!(queue.mark_failed(&id, "boom").await);

    let (status, body) = send(
        app(&queue),
        post_json(&format!("/v1/queue/messages/{id}/retry"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "retrying");
    assert_eq!(body["retry_count"], 1);
}

#[tokio::test]
async fn cancel_endpoint_mirrors_store_semantics() {
    let queue = no_auto_retry_queue();
    let id = queue.enqueue(NewMessage::new("@c", "x")).await;

    let (status, body) = send(
        app(&queue),
        post_json(&format!("/v1/queue/messages/{id}/cancel"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    // Already terminal.
    let (status, _) = send(
        app(&queue),
        post_json(&format!("/v1/queue/messages/{id}/cancel"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn retry_all_and_clear_report_counts() {
    let queue = no_auto_retry_queue();
    for n in 0..2 {
        let id = queue.enqueue(NewMessage::new(format!("@f{n}"), "x")).await;
        assert!(queue.mark_sending(&id).await);
        assert!(queue.mark_failed(&id, "boom").await);
    }

    let (status, body) = send(app(&queue), post_json("/v1/queue/retry-all", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["retried"], 2);

    let failed = queue.enqueue(NewMessage::new("@left", "x")).await;
    assert!(queue.mark_sending(&failed).await);
    assert!(queue.mark_failed(&failed, "boom").await);
    let (status, body) = send(
        app(&queue),
        Request::builder()
            .method("DELETE")
            .uri("/v1/queue/failed")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);
}

#[tokio::test]
async fn clear_completed_removes_sent_and_cancelled() {
    let queue = no_auto_retry_queue();
    let sent = queue.enqueue(NewMessage::new("@s", "x")).await;
    assert!(queue.mark_sending(&sent).await);
    assert!(queue.mark_sent(&sent).await);
    let cancelled = queue.enqueue(NewMessage::new("@c", "x")).await;
    assert!(queue.cancel(&cancelled).await);
    queue.enqueue(NewMessage::new("@p", "x")).await;

    let (status, body) = send(
        app(&queue),
        Request::builder()
            .method("DELETE")
            .uri("/v1/queue/completed")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);
    assert_eq!(queue.stats().await.total, 1);
}

#[tokio::test]
async fn pause_and_resume_toggle_queue() {
    let queue = no_auto_retry_queue();
    let (status, body) = send(app(&queue), post_json("/v1/queue/pause", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paused"], true);
    assert!(queue.is_paused().await);

    let (status, body) = send(app(&queue), post_json("/v1/queue/resume", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paused"], false);
    assert!(!queue.is_paused().await);
}

#[tokio::test]
async fn settings_get_and_partial_put() {
    let queue = no_auto_retry_queue();
    let (status, body) = send(app(&queue), get("/v1/queue/settings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["max_retries"], 3);

    let (status, body) = send(
        app(&queue),
        Request::builder()
            .method("PUT")
            .uri("/v1/queue/settings")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"max_retries": 7}).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["max_retries"], 7);
    assert_eq!(body["send_interval_secs"], 30);

    let (status, _) = send(
        app(&queue),
        Request::builder()
            .method("PUT")
            .uri("/v1/queue/settings")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"max_concurrent_sends": 0}).to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn message_listing_is_in_dispatch_order() {
    let queue = no_auto_retry_queue();
    queue.enqueue(NewMessage::new("@later", "x").with_priority(5)).await;
    queue.enqueue(NewMessage::new("@sooner", "x").with_priority(1)).await;

    let (status, body) = send(app(&queue), get("/v1/queue/messages")).await;
    assert_eq!(status, StatusCode::OK);
    let recipients: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["recipient"].as_str().unwrap())
        .collect();
    assert_eq!(recipients, vec!["@sooner", "@later"]);
}

#[tokio::test]
async fn status_filter_matches_serialized_form() {
    // The filter accepts exactly the strings the API emits.
    let queue = no_auto_retry_queue();
    let id = queue.enqueue(NewMessage::new("@a", "x")).await;
    assert!(queue.mark_sending(&id).await);
    assert!(queue.mark_failed(&id, "boom").await);
    assert_eq!(
        queue.messages_with_status(MessageStatus::Failed).await.len(),
        1
    );

    let (status, body) = send(app(&queue), get("/v1/queue/messages?status=failed")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}
