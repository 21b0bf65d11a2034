// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound send-queue for the tgflow daemon.
//!
//! The queue is fully in-memory: a [`MessageQueue`] store holding messages in
//! dispatch order, a [`PolicyTable`] that classifies send failures into retry
//! schedules, and a [`Dispatcher`] that drains the store through a
//! [`tgflow_core::SenderAdapter`] with pacing and a daily cap.

pub mod dispatcher;
pub mod policy;
pub mod settings;
pub mod stats;
pub mod store;

pub use dispatcher::Dispatcher;
pub use policy::{PolicyTable, RetryPolicy};
pub use settings::{QueueSettings, QueueSettingsUpdate};
pub use stats::QueueStats;
pub use store::MessageQueue;
