// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the tgflow daemon.
//!
//! Domain-expected queue conditions (unknown id, invalid status transition)
//! are signalled by boolean returns on the queue API, never by this type.
//! `TgflowError` is reserved for real failures: configuration, transport,
//! server startup.

use thiserror::Error;

/// The primary error type used across tgflow crates.
#[derive(Debug, Error)]
pub enum TgflowError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Bridge/transport errors (connection failure, backend rejection, bind failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TgflowError {
    /// The human-readable reason string for a failed send.
    ///
    /// This is what the queue stores as `fail_reason` and matches against
    /// the retry policy table, so it must carry the backend's own wording
    /// (e.g. `FloodWait: ...`) untouched.
    pub fn reason(&self) -> String {
        match self {
            TgflowError::Channel { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
