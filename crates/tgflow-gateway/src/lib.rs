// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST gateway for the tgflow daemon.
//!
//! Binds to loopback by default and exposes the queue's command surface for
//! the local dashboard: enqueue, retry, cancel, clear, pause/resume, stats,
//! and runtime settings.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, router, start_server};
