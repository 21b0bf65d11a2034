// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory message queue store.
//!
//! All state lives behind one mutex; mutations bump a watch-channel revision
//! counter so the dispatcher and gateway can wake on change instead of
//! polling. Invalid transitions and unknown ids return `false`, they never
//! error: callers race the dispatcher by design and a lost race is not a
//! fault.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use tgflow_core::{MessageId, MessageStatus, NewMessage, QueuedMessage};

use crate::policy::PolicyTable;
use crate::settings::{QueueSettings, QueueSettingsUpdate};
use crate::stats::{self, QueueStats};

/// Sort key for dispatch order: priority ascending, then creation time,
/// then enqueue sequence. Status never participates.
pub(crate) fn queue_order(a: &QueuedMessage, b: &QueuedMessage) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.sequence.cmp(&b.sequence))
}

struct QueueInner {
    /// Kept sorted by [`queue_order`]. The sort keys are immutable after
    /// enqueue, so re-sorting is only needed when a message is added.
    messages: Vec<QueuedMessage>,
    settings: QueueSettings,
    policies: PolicyTable,
    next_sequence: u64,
    paused: bool,
    sent_today: u64,
    current_day: NaiveDate,
}

impl QueueInner {
    fn find_mut(&mut self, id: &MessageId) -> Option<&mut QueuedMessage> {
        self.messages.iter_mut().find(|m| &m.id == id)
    }

    fn maybe_reset_day(&mut self) {
        let today = Utc::now().date_naive();
        if self.current_day != today {
            self.current_day = today;
            self.sent_today = 0;
        }
    }
}

/// Thread-safe outbound message queue.
pub struct MessageQueue {
    inner: Mutex<QueueInner>,
    revision: watch::Sender<u64>,
}

impl MessageQueue {
    pub fn new(settings: QueueSettings) -> Self {
        let policies = PolicyTable::new(settings.retry_base_delay_secs);
        let (revision, _) = watch::channel(0);
        Self {
            inner: Mutex::new(QueueInner {
                messages: Vec::new(),
                settings,
                policies,
                next_sequence: 0,
                paused: false,
                sent_today: 0,
                current_day: Utc::now().date_naive(),
            }),
            revision,
        }
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    /// Observe queue revisions. The value itself is only a change counter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Add a message to the queue. The retry budget in the current settings
    /// is captured onto the message here and never re-read.
    pub async fn enqueue(&self, new: NewMessage) -> MessageId {
        let mut inner = self.inner.lock().await;
        let id = self.insert_locked(&mut inner, new);
        drop(inner);
        self.bump();
        id
    }

    /// Add several messages atomically, preserving their relative order.
    pub async fn enqueue_batch(&self, batch: Vec<NewMessage>) -> Vec<MessageId> {
        let mut inner = self.inner.lock().await;
        let ids: Vec<MessageId> = batch
            .into_iter()
            .map(|new| self.insert_locked(&mut inner, new))
            .collect();
        drop(inner);
        if !ids.is_empty() {
            self.bump();
        }
        ids
    }

    fn insert_locked(&self, inner: &mut QueueInner, new: NewMessage) -> MessageId {
        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        let msg = QueuedMessage {
            id: MessageId::new(),
            recipient: new.recipient,
            content: new.content,
            template_id: new.template_id,
            status: MessageStatus::Pending,
            priority: new.priority,
            scheduled_at: new.scheduled_at,
            retry_count: 0,
            max_retries: inner.settings.max_retries,
            created_at: Utc::now(),
            sent_at: None,
            failed_at: None,
            fail_reason: None,
            source: new.source,
            sequence,
        };
        let id = msg.id.clone();
        debug!(id = %id, recipient = %msg.recipient, priority = msg.priority, "message enqueued");
        inner.messages.push(msg);
        inner.messages.sort_by(queue_order);
        id
    }

    /// Snapshot of all messages in dispatch order.
    pub async fn messages(&self) -> Vec<QueuedMessage> {
        self.inner.lock().await.messages.clone()
    }

    /// Snapshot of messages in one status, in dispatch order.
    pub async fn messages_with_status(&self, status: MessageStatus) -> Vec<QueuedMessage> {
        let inner = self.inner.lock().await;
        inner
            .messages
            .iter()
            .filter(|m| m.status == status)
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: &MessageId) -> Option<QueuedMessage> {
        let inner = self.inner.lock().await;
        inner.messages.iter().find(|m| &m.id == id).cloned()
    }

    /// Highest-ranked pending message that is due. Messages scheduled in the
    /// future are skipped, not blocking the ones behind them.
    pub async fn next_pending(&self) -> Option<QueuedMessage> {
        let now = Utc::now();
        let inner = self.inner.lock().await;
        inner
            .messages
            .iter()
            .find(|m| {
                m.status == MessageStatus::Pending
                    && m.scheduled_at.is_none_or(|at| at <= now)
            })
            .cloned()
    }

    /// Transition pending -> sending. The dispatcher claims a message with
    /// this before handing it to the sender.
    pub async fn mark_sending(&self, id: &MessageId) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(msg) = inner.find_mut(id) else {
            return false;
        };
        if msg.status != MessageStatus::Pending {
            return false;
        }
        msg.status = MessageStatus::Sending;
        drop(inner);
        self.bump();
        true
    }

    /// Transition sending -> sent and count it against today's tally.
    pub async fn mark_sent(&self, id: &MessageId) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(msg) = inner.find_mut(id) else {
            return false;
        };
        if msg.status != MessageStatus::Sending {
            return false;
        }
        msg.status = MessageStatus::Sent;
        msg.sent_at = Some(Utc::now());
        msg.fail_reason = None;
        inner.maybe_reset_day();
        inner.sent_today += 1;
        drop(inner);
        self.bump();
        true
    }

    /// Record a send failure and, when the reason's retry policy and both
    /// budgets allow it, schedule an automatic retry.
    ///
    /// The effective auto-retry budget is the smaller of the policy budget
    /// and the per-message budget captured at enqueue time.
    pub async fn mark_failed(self: &Arc<Self>, id: &MessageId, reason: &str) -> bool {
        let mut inner = self.inner.lock().await;
        let auto_retry = inner.settings.auto_retry;
        let policies = inner.policies.clone();
        let Some(msg) = inner.find_mut(id) else {
            return false;
        };
        if msg.status != MessageStatus::Sending {
            return false;
        }
        msg.status = MessageStatus::Failed;
        msg.failed_at = Some(Utc::now());
        msg.fail_reason = Some(reason.to_string());

        let policy = policies.classify(reason);
        let budget = policy.max_retries.min(msg.max_retries);
        if auto_retry && policy.retryable && msg.retry_count < budget {
            let attempt = msg.retry_count;
            msg.retry_count += 1;
            msg.status = MessageStatus::Retrying;
            let delay = policy.delay_for(attempt);
            info!(
                id = %id,
                policy = policy.name,
                attempt = msg.retry_count,
                delay_secs = delay.as_secs(),
                reason,
                "send failed, retry scheduled"
            );
            drop(inner);
            self.schedule_requeue(id.clone(), delay);
        } else {
            warn!(
                id = %id,
                policy = policy.name,
                retries = msg.retry_count,
                reason,
                "send failed permanently"
            );
            drop(inner);
        }
        self.bump();
        true
    }

    /// Manually re-queue a failed message. Only `Failed` messages with budget
    /// remaining qualify; a message already `Retrying` is left alone so two
    /// racing retry requests cannot double-schedule it.
    pub async fn retry(self: &Arc<Self>, id: &MessageId) -> bool {
        let mut inner = self.inner.lock().await;
        let policies = inner.policies.clone();
        let Some(msg) = inner.find_mut(id) else {
            return false;
        };
        if msg.status != MessageStatus::Failed || msg.retry_count >= msg.max_retries {
            return false;
        }
        // A non-retryable classification blocks auto-retry only; manual
        // retries back off on the fallback schedule instead.
        let classified = policies.classify(msg.fail_reason.as_deref().unwrap_or(""));
        let policy = if classified.retryable {
            classified
        } else {
            policies.fallback()
        };
        let attempt = msg.retry_count;
        msg.retry_count += 1;
        msg.status = MessageStatus::Retrying;
        let delay = policy.delay_for(attempt);
        info!(id = %id, policy = policy.name, delay_secs = delay.as_secs(), "manual retry scheduled");
        drop(inner);
        self.schedule_requeue(id.clone(), delay);
        self.bump();
        true
    }

    /// Re-queue every failed message that still has budget. Returns how many
    /// were scheduled.
    pub async fn retry_all_failed(self: &Arc<Self>) -> usize {
        let candidates: Vec<MessageId> = {
            let inner = self.inner.lock().await;
            inner
                .messages
                .iter()
                .filter(|m| m.status == MessageStatus::Failed && m.retry_count < m.max_retries)
                .map(|m| m.id.clone())
                .collect()
        };
        let mut retried = 0;
        for id in &candidates {
            if self.retry(id).await {
                retried += 1;
            }
        }
        retried
    }

    /// Cancel a message. Only `Pending` and `Failed` messages can be
    /// cancelled: `Sending` is owned by the sender, terminal states stay
    /// put, and a `Retrying` message is committed to its scheduled requeue.
    pub async fn cancel(&self, id: &MessageId) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(msg) = inner.find_mut(id) else {
            return false;
        };
        if !matches!(msg.status, MessageStatus::Pending | MessageStatus::Failed) {
            return false;
        }
        msg.status = MessageStatus::Cancelled;
        debug!(id = %id, "message cancelled");
        drop(inner);
        self.bump();
        true
    }

    /// Drop all failed messages. Returns how many were removed.
    pub async fn clear_failed(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let before = inner.messages.len();
        inner.messages.retain(|m| m.status != MessageStatus::Failed);
        let removed = before - inner.messages.len();
        drop(inner);
        if removed > 0 {
            self.bump();
        }
        removed
    }

    /// Drop all sent and cancelled messages. Returns how many were removed.
    pub async fn clear_completed(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let before = inner.messages.len();
        inner
            .messages
            .retain(|m| !matches!(m.status, MessageStatus::Sent | MessageStatus::Cancelled));
        let removed = before - inner.messages.len();
        drop(inner);
        if removed > 0 {
            self.bump();
        }
        removed
    }

    pub async fn stats(&self) -> QueueStats {
        let mut inner = self.inner.lock().await;
        inner.maybe_reset_day();
        stats::compute(&inner.messages, inner.sent_today)
    }

    pub async fn settings(&self) -> QueueSettings {
        self.inner.lock().await.settings.clone()
    }

    /// Apply a partial settings update. Messages already enqueued keep the
    /// retry budget they captured.
    pub async fn update_settings(&self, update: QueueSettingsUpdate) -> QueueSettings {
        let mut inner = self.inner.lock().await;
        inner.settings.apply(update);
        inner.policies = PolicyTable::new(inner.settings.retry_base_delay_secs);
        let settings = inner.settings.clone();
        drop(inner);
        info!("queue settings updated");
        self.bump();
        settings
    }

    pub async fn pause(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.paused {
            inner.paused = true;
            drop(inner);
            info!("queue paused");
            self.bump();
        }
    }

    pub async fn resume(&self) {
        let mut inner = self.inner.lock().await;
        if inner.paused {
            inner.paused = false;
            drop(inner);
            info!("queue resumed");
            self.bump();
        }
    }

    pub async fn is_paused(&self) -> bool {
        self.inner.lock().await.paused
    }

    /// Whether today's send cap has been hit. Always `false` when no cap is
    /// configured. Resets at UTC midnight.
    pub async fn daily_limit_reached(&self) -> bool {
        let mut inner = self.inner.lock().await;
        inner.maybe_reset_day();
        match inner.settings.daily_send_limit {
            Some(limit) => inner.sent_today >= limit,
            None => false,
        }
    }

    /// Pause the dispatcher should take after a send: the configured base
    /// interval plus optional random jitter.
    pub async fn send_delay(&self) -> Duration {
        let inner = self.inner.lock().await;
        let settings = &inner.settings;
        let mut secs = settings.send_interval_secs;
        if settings.random_delay && settings.random_delay_min_secs <= settings.random_delay_max_secs
        {
            use rand::Rng;
            secs += rand::thread_rng()
                .gen_range(settings.random_delay_min_secs..=settings.random_delay_max_secs);
        }
        Duration::from_secs(secs)
    }

    /// After `delay`, move a retrying message back to pending. The status
    /// guard makes a stale timer harmless: if the message was cancelled or
    /// cleared while waiting, nothing happens.
    fn schedule_requeue(self: &Arc<Self>, id: MessageId, delay: Duration) {
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = queue.inner.lock().await;
            match inner.find_mut(&id) {
                Some(msg) if msg.status == MessageStatus::Retrying => {
                    msg.status = MessageStatus::Pending;
                    debug!(id = %id, "retry wait elapsed, message re-queued");
                    drop(inner);
                    queue.bump();
                }
                _ => {
                    debug!(id = %id, "retry timer fired for a message no longer retrying");
                }
            }
        });
    }
}
