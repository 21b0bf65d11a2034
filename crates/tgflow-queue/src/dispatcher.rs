// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send loop: drains the queue through a [`SenderAdapter`] with pacing,
//! concurrency limiting, and pause/daily-cap gating.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tgflow_core::SenderAdapter;

use crate::store::MessageQueue;

/// How often an idle dispatcher re-checks the queue even without a revision
/// change. Covers scheduled messages coming due and the UTC day rollover,
/// neither of which bumps the revision.
const IDLE_TICK: Duration = Duration::from_secs(5);

/// Drives sends from a [`MessageQueue`] through one [`SenderAdapter`].
pub struct Dispatcher {
    queue: Arc<MessageQueue>,
    sender: Arc<dyn SenderAdapter>,
    shutdown: CancellationToken,
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    /// Build a dispatcher. The concurrency limit is sampled from the queue
    /// settings here; later settings changes apply after a restart.
    pub async fn new(
        queue: Arc<MessageQueue>,
        sender: Arc<dyn SenderAdapter>,
        shutdown: CancellationToken,
    ) -> Self {
        let max_concurrent = queue.settings().await.max_concurrent_sends.max(1);
        Self {
            queue,
            sender,
            shutdown,
            permits: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Run until the shutdown token fires. Sends already in flight are
    /// detached tasks and finish on their own.
    pub async fn run(&self) {
        let mut changes = self.queue.subscribe();
        changes.mark_unchanged();
        info!(sender = self.sender.name(), "dispatcher started");

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            if self.queue.is_paused().await {
                if self.wait_for_change(&mut changes).await {
                    break;
                }
                continue;
            }

            if self.queue.daily_limit_reached().await {
                debug!("daily send limit reached, dispatcher idling");
                if self.wait_for_change(&mut changes).await {
                    break;
                }
                continue;
            }

            let Some(msg) = self.queue.next_pending().await else {
                if self.wait_for_change(&mut changes).await {
                    break;
                }
                continue;
            };

            // Claim it; another path may have grabbed it since the snapshot.
            if !self.queue.mark_sending(&msg.id).await {
                continue;
            }

            let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
                break;
            };
            let queue = Arc::clone(&self.queue);
            let sender = Arc::clone(&self.sender);
            tokio::spawn(async move {
                let _permit = permit;
                match sender.send(&msg).await {
                    Ok(()) => {
                        queue.mark_sent(&msg.id).await;
                        debug!(id = %msg.id, recipient = %msg.recipient, "message sent");
                    }
                    Err(err) => {
                        let reason = err.reason();
                        warn!(id = %msg.id, recipient = %msg.recipient, %reason, "send failed");
                        queue.mark_failed(&msg.id, &reason).await;
                    }
                }
            });

            let delay = self.queue.send_delay().await;
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("dispatcher stopped");
    }

    /// Park until the queue changes, the idle tick elapses, or shutdown.
    /// Returns `true` on shutdown.
    async fn wait_for_change(&self, changes: &mut watch::Receiver<u64>) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => true,
            _ = changes.changed() => false,
            _ = tokio::time::sleep(IDLE_TICK) => false,
        }
    }
}
