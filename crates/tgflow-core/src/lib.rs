// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the tgflow send-queue daemon.
//!
//! Provides the shared message types, the error type, and the sender adapter
//! trait that the queue, bridge, and gateway crates build on.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TgflowError;
pub use traits::SenderAdapter;
pub use types::{
    HealthStatus, MessageId, MessageSource, MessageStatus, NewMessage, QueuedMessage,
};
