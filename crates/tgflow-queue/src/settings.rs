// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime queue settings and the partial-update type the gateway applies.

use serde::{Deserialize, Serialize};
use tgflow_config::model::QueueConfig;

/// Live queue behavior knobs.
///
/// Seeded from [`QueueConfig`] at startup and adjustable at runtime through
/// the gateway. `max_retries` only affects messages enqueued after a change;
/// each message captures its budget at enqueue time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Base pause between consecutive sends, in seconds.
    pub send_interval_secs: u64,
    /// Retry budget copied onto each message at enqueue time.
    pub max_retries: u32,
    /// Add a random extra delay between sends.
    pub random_delay: bool,
    /// Lower bound of the random extra delay, in seconds.
    pub random_delay_min_secs: u64,
    /// Upper bound of the random extra delay, in seconds.
    pub random_delay_max_secs: u64,
    /// Automatically re-queue retryable failures.
    pub auto_retry: bool,
    /// Base delay for the fallback retry policy, in seconds.
    pub retry_base_delay_secs: u64,
    /// Maximum number of sends in flight at once.
    pub max_concurrent_sends: usize,
    /// Hard cap on messages sent per UTC day. `None` disables the cap.
    pub daily_send_limit: Option<u64>,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self::from(&QueueConfig::default())
    }
}

impl From<&QueueConfig> for QueueSettings {
    fn from(config: &QueueConfig) -> Self {
        Self {
            send_interval_secs: config.send_interval_secs,
            max_retries: config.max_retries,
            random_delay: config.random_delay,
            random_delay_min_secs: config.random_delay_min_secs,
            random_delay_max_secs: config.random_delay_max_secs,
            auto_retry: config.auto_retry,
            retry_base_delay_secs: config.retry_base_delay_secs,
            max_concurrent_sends: config.max_concurrent_sends,
            daily_send_limit: config.daily_send_limit,
        }
    }
}

/// Partial settings update. Absent fields keep their current value;
/// `clear_daily_send_limit` removes the daily cap explicitly, since an
/// absent `daily_send_limit` is indistinguishable from "leave it alone".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueSettingsUpdate {
    pub send_interval_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub random_delay: Option<bool>,
    pub random_delay_min_secs: Option<u64>,
    pub random_delay_max_secs: Option<u64>,
    pub auto_retry: Option<bool>,
    pub retry_base_delay_secs: Option<u64>,
    pub max_concurrent_sends: Option<usize>,
    pub daily_send_limit: Option<u64>,
    #[serde(default)]
    pub clear_daily_send_limit: bool,
}

impl QueueSettings {
    /// Merge a partial update into these settings.
    pub fn apply(&mut self, update: QueueSettingsUpdate) {
        if let Some(v) = update.send_interval_secs {
            self.send_interval_secs = v;
        }
        if let Some(v) = update.max_retries {
            self.max_retries = v;
        }
        if let Some(v) = update.random_delay {
            self.random_delay = v;
        }
        if let Some(v) = update.random_delay_min_secs {
            self.random_delay_min_secs = v;
        }
        if let Some(v) = update.random_delay_max_secs {
            self.random_delay_max_secs = v;
        }
        if let Some(v) = update.auto_retry {
            self.auto_retry = v;
        }
        if let Some(v) = update.retry_base_delay_secs {
            self.retry_base_delay_secs = v;
        }
        if let Some(v) = update.max_concurrent_sends {
            self.max_concurrent_sends = v;
        }
        if let Some(v) = update.daily_send_limit {
            self.daily_send_limit = Some(v);
        }
        if update.clear_daily_send_limit {
            self.daily_send_limit = None;
        }
    }
}
