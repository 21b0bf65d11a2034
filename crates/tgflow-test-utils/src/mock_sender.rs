// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriptable in-memory [`SenderAdapter`] for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tgflow_core::{HealthStatus, QueuedMessage, SenderAdapter, TgflowError};

/// A sender that records every message it receives and fails on demand.
///
/// Outcomes are consumed in FIFO order: each queued failure applies to
/// exactly one send, and sends beyond the script succeed.
pub struct MockSender {
    outcomes: Mutex<VecDeque<Result<(), String>>>,
    sent: Mutex<Vec<QueuedMessage>>,
    attempts: Mutex<usize>,
    healthy: Mutex<bool>,
}

impl MockSender {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
            healthy: Mutex::new(true),
        }
    }

    /// Make the next send fail with the given reason.
    pub fn fail_next(&self, reason: &str) {
        self.outcomes
            .lock()
            .expect("mock lock")
            .push_back(Err(reason.to_string()));
    }

    /// Queue an explicit outcome for one future send.
    pub fn push_outcome(&self, outcome: Result<(), String>) {
        self.outcomes.lock().expect("mock lock").push_back(outcome);
    }

    pub fn set_healthy(&self, healthy: bool) {
        *self.healthy.lock().expect("mock lock") = healthy;
    }

    /// Messages that were successfully "sent", in order.
    pub fn sent_messages(&self) -> Vec<QueuedMessage> {
        self.sent.lock().expect("mock lock").clone()
    }

    /// Recipients of successful sends, in order.
    pub fn sent_recipients(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("mock lock")
            .iter()
            .map(|m| m.recipient.clone())
            .collect()
    }

    /// Total send attempts, successful or not.
    pub fn send_count(&self) -> usize {
        *self.attempts.lock().expect("mock lock")
    }
}

#[async_trait]
impl SenderAdapter for MockSender {
    fn name(&self) -> &str {
        "mock"
    }

    async fn health_check(&self) -> Result<HealthStatus, TgflowError> {
        if *self.healthy.lock().expect("mock lock") {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("mock unhealthy".to_string()))
        }
    }

    async fn send(&self, msg: &QueuedMessage) -> Result<(), TgflowError> {
        *self.attempts.lock().expect("mock lock") += 1;
        let outcome = self
            .outcomes
            .lock()
            .expect("mock lock")
            .pop_front()
            .unwrap_or(Ok(()));
        match outcome {
            Ok(()) => {
                self.sent.lock().expect("mock lock").push(msg.clone());
                Ok(())
            }
            Err(reason) => Err(TgflowError::Channel {
                message: reason,
                source: None,
            }),
        }
    }
}
