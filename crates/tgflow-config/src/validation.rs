// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as delay ranges and address formats.

use crate::diagnostic::ConfigError;
use crate::model::TgflowConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TgflowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.queue.random_delay && config.queue.random_delay_min_secs > config.queue.random_delay_max_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "queue.random_delay_min_secs ({}) must not exceed queue.random_delay_max_secs ({})",
                config.queue.random_delay_min_secs, config.queue.random_delay_max_secs
            ),
        });
    }

    if config.queue.max_concurrent_sends < 1 {
        errors.push(ConfigError::Validation {
            message: "queue.max_concurrent_sends must be at least 1".to_string(),
        });
    }

    if let Some(limit) = config.queue.daily_send_limit
        && limit == 0
    {
        errors.push(ConfigError::Validation {
            message: "queue.daily_send_limit must be positive; omit it to disable the cap"
                .to_string(),
        });
    }

    if config.queue.retry_base_delay_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.retry_base_delay_secs must be positive".to_string(),
        });
    }

    let base_url = config.bridge.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "bridge.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("bridge.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
