// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tgflow.toml` > `~/.config/tgflow/tgflow.toml` > `/etc/tgflow/tgflow.toml`
//! with environment variable overrides via `TGFLOW_` prefix.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TgflowConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tgflow/tgflow.toml` (system-wide)
/// 3. `~/.config/tgflow/tgflow.toml` (user XDG config)
/// 4. `./tgflow.toml` (local directory)
/// 5. `TGFLOW_*` environment variables
pub fn load_config() -> Result<TgflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TgflowConfig::default()))
        .merge(Toml::file("/etc/tgflow/tgflow.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tgflow/tgflow.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tgflow.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and for callers that already hold the TOML content.
pub fn load_config_from_str(toml_content: &str) -> Result<TgflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TgflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TgflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TgflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `TGFLOW_QUEUE_MAX_RETRIES`
/// must map to `queue.max_retries`, not `queue.max.retries`.
fn env_provider() -> Env {
    Env::prefixed("TGFLOW_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: TGFLOW_QUEUE_MAX_RETRIES -> "queue_max_retries"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("daemon_", "daemon.", 1)
            .replacen("queue_", "queue.", 1)
            .replacen("bridge_", "bridge.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
