// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles shared across the tgflow workspace.

mod mock_sender;

pub use mock_sender::MockSender;
