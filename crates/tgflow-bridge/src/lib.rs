// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP bridge to the backend that owns the Telegram sessions.
//!
//! The daemon never talks to Telegram directly; it POSTs each outbound
//! message to the backend's send API and maps the response onto the queue's
//! success/failure model. Failure reasons are passed through verbatim so the
//! retry policy table can classify them (FloodWait text, HTTP 429, and so
//! on arrive exactly as the backend reported them).

mod sender;

pub use sender::BridgeSender;
