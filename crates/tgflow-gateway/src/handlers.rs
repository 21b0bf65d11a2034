// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Transition endpoints map the store's boolean results onto HTTP: unknown
//! id is 404, a transition the message's current status does not allow is
//! 409. The store itself never errors on those.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use tgflow_core::{MessageId, MessageStatus, NewMessage, QueuedMessage};
use tgflow_queue::{QueueSettings, QueueSettingsUpdate, QueueStats};

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Response body for enqueue endpoints.
#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub id: MessageId,
}

#[derive(Debug, Serialize)]
pub struct BatchEnqueueResponse {
    pub ids: Vec<MessageId>,
}

#[derive(Debug, Serialize)]
pub struct RetriedResponse {
    pub retried: usize,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct PausedResponse {
    pub paused: bool,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /v1/queue/stats
pub async fn get_stats(State(state): State<GatewayState>) -> Json<QueueStats> {
    Json(state.queue.stats().await)
}

/// Query parameters for GET /v1/queue/messages.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// GET /v1/queue/messages[?status=]
pub async fn list_messages(
    State(state): State<GatewayState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let messages: Vec<QueuedMessage> = match query.status.as_deref() {
        None => state.queue.messages().await,
        Some(raw) => match MessageStatus::from_str(raw) {
            Ok(status) => state.queue.messages_with_status(status).await,
            Err(_) => {
                return error(
                    StatusCode::BAD_REQUEST,
                    format!("unknown status filter `{raw}`"),
                );
            }
        },
    };
    Json(messages).into_response()
}

fn validate(new: &NewMessage) -> Option<&'static str> {
    if new.recipient.trim().is_empty() {
        Some("recipient must not be empty")
    } else if new.content.trim().is_empty() {
        Some("content must not be empty")
    } else {
        None
    }
}

/// POST /v1/queue/messages
pub async fn post_message(
    State(state): State<GatewayState>,
    Json(body): Json<NewMessage>,
) -> Response {
    if let Some(problem) = validate(&body) {
        return error(StatusCode::BAD_REQUEST, problem);
    }
    let id = state.queue.enqueue(body).await;
    (StatusCode::CREATED, Json(EnqueueResponse { id })).into_response()
}

/// Request body for POST /v1/queue/messages/batch.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub messages: Vec<NewMessage>,
}

/// POST /v1/queue/messages/batch
pub async fn post_batch(
    State(state): State<GatewayState>,
    Json(body): Json<BatchRequest>,
) -> Response {
    if body.messages.is_empty() {
        return error(StatusCode::BAD_REQUEST, "batch must not be empty");
    }
    for new in &body.messages {
        if let Some(problem) = validate(new) {
            return error(StatusCode::BAD_REQUEST, problem);
        }
    }
    let ids = state.queue.enqueue_batch(body.messages).await;
    (StatusCode::CREATED, Json(BatchEnqueueResponse { ids })).into_response()
}

/// POST /v1/queue/messages/{id}/retry
pub async fn retry_message(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    let id = MessageId(id);
    if state.queue.get(&id).await.is_none() {
        return error(StatusCode::NOT_FOUND, format!("no message with id {id}"));
    }
    if !state.queue.retry(&id).await {
        return error(
            StatusCode::CONFLICT,
            "message is not failed or its retry budget is exhausted",
        );
    }
    match state.queue.get(&id).await {
        Some(msg) => Json(msg).into_response(),
        None => error(StatusCode::NOT_FOUND, format!("no message with id {id}")),
    }
}

/// POST /v1/queue/messages/{id}/cancel
pub async fn cancel_message(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    let id = MessageId(id);
    if state.queue.get(&id).await.is_none() {
        return error(StatusCode::NOT_FOUND, format!("no message with id {id}"));
    }
    if !state.queue.cancel(&id).await {
        return error(
            StatusCode::CONFLICT,
            "message cannot be cancelled in its current status",
        );
    }
    match state.queue.get(&id).await {
        Some(msg) => Json(msg).into_response(),
        None => error(StatusCode::NOT_FOUND, format!("no message with id {id}")),
    }
}

/// POST /v1/queue/retry-all
pub async fn retry_all(State(state): State<GatewayState>) -> Json<RetriedResponse> {
    let retried = state.queue.retry_all_failed().await;
    Json(RetriedResponse { retried })
}

/// DELETE /v1/queue/failed
pub async fn clear_failed(State(state): State<GatewayState>) -> Json<RemovedResponse> {
    let removed = state.queue.clear_failed().await;
    Json(RemovedResponse { removed })
}

/// DELETE /v1/queue/completed
pub async fn clear_completed(State(state): State<GatewayState>) -> Json<RemovedResponse> {
    let removed = state.queue.clear_completed().await;
    Json(RemovedResponse { removed })
}

/// POST /v1/queue/pause
pub async fn pause_queue(State(state): State<GatewayState>) -> Json<PausedResponse> {
    state.queue.pause().await;
    Json(PausedResponse { paused: true })
}

/// POST /v1/queue/resume
pub async fn resume_queue(State(state): State<GatewayState>) -> Json<PausedResponse> {
    state.queue.resume().await;
    Json(PausedResponse { paused: false })
}

/// GET /v1/queue/settings
pub async fn get_settings(State(state): State<GatewayState>) -> Json<QueueSettings> {
    Json(state.queue.settings().await)
}

/// PUT /v1/queue/settings
pub async fn put_settings(
    State(state): State<GatewayState>,
    Json(update): Json<QueueSettingsUpdate>,
) -> Response {
    if let (Some(min), Some(max)) = (update.random_delay_min_secs, update.random_delay_max_secs)
        && min > max
    {
        return error(
            StatusCode::BAD_REQUEST,
            "random_delay_min_secs must not exceed random_delay_max_secs",
        );
    }
    if update.max_concurrent_sends == Some(0) {
        return error(
            StatusCode::BAD_REQUEST,
            "max_concurrent_sends must be at least 1",
        );
    }
    let settings = state.queue.update_settings(update).await;
    Json(settings).into_response()
}
