// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry policy table: maps a failure reason to a bounded back-off schedule.
//!
//! Policies are tried in order against the lowercased reason string; the
//! first predicate match wins and the fallback applies unconditionally when
//! nothing else matches. Classification and delay lookup are pure functions.

use std::time::Duration;

/// A named retry rule for one class of send failure.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Stable policy name for logs and diagnostics.
    pub name: &'static str,
    /// Whether this failure class is ever auto-retried.
    pub retryable: bool,
    /// Auto-retry budget for this class. The per-message budget captured at
    /// enqueue time always caps this, never the other way around.
    pub max_retries: u32,
    /// Back-off schedule in seconds, clamped to its last element.
    pub delays: Vec<u64>,
    matcher: fn(&str) -> bool,
}

impl RetryPolicy {
    /// Delay before the given retry attempt (0-based).
    ///
    /// Attempts beyond the schedule keep the last delay; they never shrink
    /// back to a short interval. Non-retryable policies have no schedule and
    /// yield zero.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.delays.last() {
            None => Duration::ZERO,
            Some(last) => {
                let secs = self
                    .delays
                    .get(attempt as usize)
                    .copied()
                    .unwrap_or(*last);
                Duration::from_secs(secs)
            }
        }
    }
}

/// Ordered collection of retry policies plus the unconditional fallback.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    policies: Vec<RetryPolicy>,
    fallback: RetryPolicy,
}

fn matches_flood_wait(reason: &str) -> bool {
    reason.contains("flood")
}

fn matches_rate_limit(reason: &str) -> bool {
    reason.contains("rate limit") || reason.contains("429") || reason.contains("too many")
}

fn matches_network(reason: &str) -> bool {
    reason.contains("network") || reason.contains("timeout") || reason.contains("connection")
}

fn matches_blocked(reason: &str) -> bool {
    reason.contains("blocked") || reason.contains("deactivated") || reason.contains("privacy")
}

fn matches_any(_reason: &str) -> bool {
    true
}

impl PolicyTable {
    /// Build the table. `base_delay_secs` seeds the fallback schedule
    /// (`base, base*2, base*4`); the named policies are fixed.
    pub fn new(base_delay_secs: u64) -> Self {
        Self {
            policies: vec![
                RetryPolicy {
                    name: "flood_wait",
                    retryable: true,
                    max_retries: 5,
                    delays: vec![60, 120, 300, 600, 900],
                    matcher: matches_flood_wait,
                },
                RetryPolicy {
                    name: "rate_limit",
                    retryable: true,
                    max_retries: 3,
                    delays: vec![30, 60, 120],
                    matcher: matches_rate_limit,
                },
                RetryPolicy {
                    name: "network",
                    retryable: true,
                    max_retries: 3,
                    delays: vec![10, 30, 60],
                    matcher: matches_network,
                },
                RetryPolicy {
                    name: "blocked",
                    retryable: false,
                    max_retries: 0,
                    delays: vec![],
                    matcher: matches_blocked,
                },
            ],
            fallback: RetryPolicy {
                name: "default",
                retryable: true,
                max_retries: 3,
                delays: vec![base_delay_secs, base_delay_secs * 2, base_delay_secs * 4],
                matcher: matches_any,
            },
        }
    }

    /// Select the policy for a failure reason. Matching is case-insensitive
    /// substring matching; unknown or empty reasons fall through to the
    /// fallback.
    pub fn classify(&self, reason: &str) -> &RetryPolicy {
        let reason = reason.to_lowercase();
        self.policies
            .iter()
            .find(|p| (p.matcher)(&reason))
            .unwrap_or(&self.fallback)
    }

    /// The unconditional fallback policy.
    pub fn fallback(&self) -> &RetryPolicy {
        &self.fallback
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::new(30)
    }
}
