// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the tgflow daemon.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level tgflow configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TgflowConfig {
    /// Daemon identity and logging settings.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Outbound send-queue behavior.
    #[serde(default)]
    pub queue: QueueConfig,

    /// HTTP bridge to the backend holding the Telegram sessions.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Local REST gateway the dashboard consumes.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Daemon identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    /// Display name of the daemon instance.
    #[serde(default = "default_daemon_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            name: default_daemon_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_daemon_name() -> String {
    "tgflow".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Outbound queue behavior configuration.
///
/// These values seed the queue's runtime settings at startup; per-message
/// retry budgets are captured at enqueue time, so later changes only affect
/// messages enqueued afterward.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Base pause between consecutive sends, in seconds.
    #[serde(default = "default_send_interval_secs")]
    pub send_interval_secs: u64,

    /// Retry budget copied onto each message at enqueue time.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Add a random extra delay between sends (anti-burst pacing).
    #[serde(default = "default_true")]
    pub random_delay: bool,

    /// Lower bound of the random extra delay, in seconds.
    #[serde(default = "default_random_delay_min_secs")]
    pub random_delay_min_secs: u64,

    /// Upper bound of the random extra delay, in seconds.
    #[serde(default = "default_random_delay_max_secs")]
    pub random_delay_max_secs: u64,

    /// Automatically re-queue retryable failures.
    #[serde(default = "default_true")]
    pub auto_retry: bool,

    /// Base delay for the fallback retry policy, in seconds.
    #[serde(default = "default_retry_base_delay_secs")]
    pub retry_base_delay_secs: u64,

    /// Maximum number of sends in flight at once.
    #[serde(default = "default_max_concurrent_sends")]
    pub max_concurrent_sends: usize,

    /// Hard cap on messages sent per UTC day. `None` disables the cap.
    #[serde(default)]
    pub daily_send_limit: Option<u64>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            send_interval_secs: default_send_interval_secs(),
            max_retries: default_max_retries(),
            random_delay: true,
            random_delay_min_secs: default_random_delay_min_secs(),
            random_delay_max_secs: default_random_delay_max_secs(),
            auto_retry: true,
            retry_base_delay_secs: default_retry_base_delay_secs(),
            max_concurrent_sends: default_max_concurrent_sends(),
            daily_send_limit: None,
        }
    }
}

fn default_send_interval_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_random_delay_min_secs() -> u64 {
    5
}

fn default_random_delay_max_secs() -> u64 {
    30
}

fn default_retry_base_delay_secs() -> u64 {
    30
}

fn default_max_concurrent_sends() -> usize {
    1
}

/// HTTP bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Base URL of the backend send API.
    #[serde(default = "default_bridge_base_url")]
    pub base_url: String,

    /// Bearer token for the backend. `None` sends unauthenticated requests.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_bridge_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: default_bridge_base_url(),
            api_token: None,
            timeout_secs: default_bridge_timeout_secs(),
        }
    }
}

fn default_bridge_base_url() -> String {
    "http://127.0.0.1:8787".to_string()
}

fn default_bridge_timeout_secs() -> u64 {
    30
}

/// Local REST gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind. Loopback by default; the dashboard runs locally.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8788
}
