// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tgflow_config::model::GatewayConfig;
use tgflow_core::TgflowError;
use tgflow_queue::MessageQueue;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The queue every endpoint operates on.
    pub queue: Arc<MessageQueue>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(queue: Arc<MessageQueue>) -> Self {
        Self {
            queue,
            start_time: Instant::now(),
        }
    }
}

/// Build the gateway router. Split out from [`start_server`] so tests can
/// drive it without binding a socket.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/queue/stats", get(handlers::get_stats))
        .route("/v1/queue/messages", get(handlers::list_messages))
        .route("/v1/queue/messages", post(handlers::post_message))
        .route("/v1/queue/messages/batch", post(handlers::post_batch))
        .route("/v1/queue/messages/{id}/retry", post(handlers::retry_message))
        .route("/v1/queue/messages/{id}/cancel", post(handlers::cancel_message))
        .route("/v1/queue/retry-all", post(handlers::retry_all))
        .route("/v1/queue/failed", delete(handlers::clear_failed))
        .route("/v1/queue/completed", delete(handlers::clear_completed))
        .route("/v1/queue/pause", post(handlers::pause_queue))
        .route("/v1/queue/resume", post(handlers::resume_queue))
        .route("/v1/queue/settings", get(handlers::get_settings))
        .route("/v1/queue/settings", put(handlers::put_settings))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server and serve until the token fires.
pub async fn start_server(
    config: &GatewayConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), TgflowError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TgflowError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| TgflowError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
