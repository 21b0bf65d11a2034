// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the tgflow workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a queued message. Assigned at enqueue time, immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Delivery status of a queued message.
///
/// A message is in exactly one status at any time. `Sent` and `Cancelled`
/// are terminal; `Failed` is terminal once the retry budget is exhausted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Sending,
    Sent,
    Failed,
    Cancelled,
    Retrying,
}

/// Which subsystem produced a message. Informational only, never used for ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize, Default,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    #[default]
    Manual,
    Automation,
    Batch,
    FollowUp,
}

/// One outbound message awaiting delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedMessage {
    /// Opaque unique id, assigned at enqueue time.
    pub id: MessageId,
    /// Recipient identity (Telegram username, phone, or chat id as text).
    pub recipient: String,
    /// Free-text message body.
    pub content: String,
    /// Optional reference to the template this message was rendered from.
    pub template_id: Option<String>,
    /// Current delivery status.
    pub status: MessageStatus,
    /// Integer priority; lower value = sent sooner.
    pub priority: i32,
    /// Optional earliest delivery time. The dispatcher skips the message until due.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Number of retries consumed so far. Never exceeds `max_retries`.
    pub retry_count: u32,
    /// Retry budget, copied from queue settings at enqueue time so later
    /// settings changes don't retroactively alter in-flight messages.
    pub max_retries: u32,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    /// Last failure reason reported by the sender; drives retry classification.
    pub fail_reason: Option<String>,
    /// Provenance tag.
    pub source: MessageSource,
    /// Store-assigned monotonic enqueue counter; ordering tiebreaker when
    /// two messages share a priority and creation timestamp.
    pub sequence: u64,
}

impl QueuedMessage {
    /// Whether no further automatic transition can occur for this message.
    pub fn is_terminal(&self) -> bool {
        match self.status {
            MessageStatus::Sent | MessageStatus::Cancelled => true,
            MessageStatus::Failed => self.retry_count >= self.max_retries,
            _ => false,
        }
    }
}

/// A send request as accepted by the queue; everything else on
/// [`QueuedMessage`] is assigned by the store at enqueue time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub recipient: String,
    pub content: String,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: MessageSource,
}

impl NewMessage {
    /// A plain manual message with default priority and no schedule.
    pub fn new(recipient: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            content: content.into(),
            template_id: None,
            priority: 0,
            scheduled_at: None,
            source: MessageSource::Manual,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_source(mut self, source: MessageSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }
}

/// Health status reported by sender adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}
