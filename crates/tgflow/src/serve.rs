// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tgflow serve` command implementation.
//!
//! Wires the queue store, the bridge sender, the dispatcher, and the REST
//! gateway together and runs until a shutdown signal arrives.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use tgflow_bridge::BridgeSender;
use tgflow_config::TgflowConfig;
use tgflow_core::{HealthStatus, SenderAdapter, TgflowError};
use tgflow_gateway::{GatewayState, start_server};
use tgflow_queue::{Dispatcher, MessageQueue, QueueSettings};

/// Runs the `tgflow serve` command.
pub async fn run_serve(config: TgflowConfig) -> Result<(), TgflowError> {
    init_tracing(&config.daemon.log_level);

    info!(name = %config.daemon.name, "starting tgflow serve");

    let queue = Arc::new(MessageQueue::new(QueueSettings::from(&config.queue)));
    let sender: Arc<dyn SenderAdapter> = Arc::new(BridgeSender::new(&config.bridge)?);

    // A dead backend is not fatal; sends will fail and retry once it is up.
    match sender.health_check().await {
        Ok(HealthStatus::Healthy) => info!("bridge backend reachable"),
        Ok(HealthStatus::Degraded(reason)) => warn!(%reason, "bridge backend degraded"),
        Ok(HealthStatus::Unhealthy(reason)) => warn!(%reason, "bridge backend unreachable"),
        Err(err) => warn!(error = %err, "bridge health check failed"),
    }

    let cancel = install_signal_handler();

    let dispatcher = Dispatcher::new(Arc::clone(&queue), sender, cancel.clone()).await;
    let dispatcher_task = tokio::spawn(async move { dispatcher.run().await });

    let gateway_state = GatewayState::new(Arc::clone(&queue));
    let gateway_result = start_server(&config.gateway, gateway_state, cancel.clone()).await;
    if let Err(err) = &gateway_result {
        error!(error = %err, "gateway exited with error");
        // Take the dispatcher down with us.
        cancel.cancel();
    }

    if let Err(err) = dispatcher_task.await {
        error!(error = %err, "dispatcher task panicked");
    }

    info!("tgflow serve shutdown complete");
    gateway_result
}

/// Install a Ctrl-C handler that fires a cancellation token.
fn install_signal_handler() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for shutdown signal");
            return;
        }
        info!("shutdown signal received");
        trigger.cancel();
    });
    cancel
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tgflow={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
