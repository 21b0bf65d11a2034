// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue statistics snapshot.

use serde::{Deserialize, Serialize};
use tgflow_core::{MessageStatus, QueuedMessage};

/// Point-in-time counters over the whole queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    pub pending: usize,
    pub sending: usize,
    pub sent: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub retrying: usize,
    /// Total messages currently held, across all statuses.
    pub total: usize,
    /// Messages marked sent since the last UTC midnight.
    pub sent_today: u64,
    /// `sent / (sent + failed) * 100`. Reported as 100.0 when no send has
    /// reached a terminal outcome yet, so an idle queue never reads as broken.
    pub success_rate: f64,
}

pub(crate) fn compute(messages: &[QueuedMessage], sent_today: u64) -> QueueStats {
    let mut stats = QueueStats {
        pending: 0,
        sending: 0,
        sent: 0,
        failed: 0,
        cancelled: 0,
        retrying: 0,
        total: messages.len(),
        sent_today,
        success_rate: 100.0,
    };
    for msg in messages {
        match msg.status {
            MessageStatus::Pending => stats.pending += 1,
            MessageStatus::Sending => stats.sending += 1,
            MessageStatus::Sent => stats.sent += 1,
            MessageStatus::Failed => stats.failed += 1,
            MessageStatus::Cancelled => stats.cancelled += 1,
            MessageStatus::Retrying => stats.retrying += 1,
        }
    }
    let outcomes = stats.sent + stats.failed;
    if outcomes > 0 {
        stats.success_rate = stats.sent as f64 / outcomes as f64 * 100.0;
    }
    stats
}
