// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait for the external sending collaborator.

use async_trait::async_trait;

use crate::error::TgflowError;
use crate::types::{HealthStatus, QueuedMessage};

/// Adapter that performs the actual delivery of a queued message.
///
/// The queue drives the lifecycle (`mark_sending` before the call, exactly one
/// of `mark_sent`/`mark_failed` after) and makes no assumption about the
/// transport. On failure the error's [`reason`](TgflowError::reason) string is
/// recorded on the message and matched against the retry policy table, so
/// implementations must preserve the backend's wording.
#[async_trait]
pub trait SenderAdapter: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Check whether the adapter can reach its backend.
    async fn health_check(&self) -> Result<HealthStatus, TgflowError>;

    /// Deliver one message. Must not retry internally; retrying is the
    /// queue's responsibility.
    async fn send(&self, msg: &QueuedMessage) -> Result<(), TgflowError>;
}
