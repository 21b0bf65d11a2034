// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tgflow status` command implementation.
//!
//! Connects to the gateway of a running daemon and displays queue counters.
//! Falls back gracefully when the daemon is not running.

use std::io::IsTerminal;
use std::time::Duration;

use colored::Colorize;
use serde::{Deserialize, Serialize};

use tgflow_config::TgflowConfig;
use tgflow_core::TgflowError;
use tgflow_queue::QueueStats;

/// Health endpoint response from the gateway.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    uptime_secs: u64,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub status: String,
    pub uptime_secs: Option<u64>,
    pub stats: Option<QueueStats>,
    pub gateway_host: String,
    pub gateway_port: u16,
}

/// Format seconds into a human-readable duration string.
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Run the `tgflow status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(
    config: &TgflowConfig,
    json: bool,
    plain: bool,
) -> Result<(), TgflowError> {
    if plain || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let host = &config.gateway.host;
    let port = config.gateway.port;
    let base = format!("http://{host}:{port}");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| TgflowError::Internal(format!("failed to create HTTP client: {e}")))?;

    let health: Option<HealthResponse> = match client.get(format!("{base}/health")).send().await {
        Ok(resp) if resp.status().is_success() => resp.json().await.ok(),
        _ => None,
    };

    let Some(health) = health else {
        if json {
            let out = StatusResponse {
                running: false,
                status: "stopped".to_string(),
                uptime_secs: None,
                stats: None,
                gateway_host: host.clone(),
                gateway_port: port,
            };
            println!("{}", render_json(&out)?);
        } else {
            println!("{} daemon not running (no gateway at {base})", "○".red());
        }
        return Ok(());
    };

    let stats: Option<QueueStats> = match client.get(format!("{base}/v1/queue/stats")).send().await
    {
        Ok(resp) if resp.status().is_success() => resp.json().await.ok(),
        _ => None,
    };

    if json {
        let out = StatusResponse {
            running: true,
            status: health.status,
            uptime_secs: Some(health.uptime_secs),
            stats,
            gateway_host: host.clone(),
            gateway_port: port,
        };
        println!("{}", render_json(&out)?);
        return Ok(());
    }

    println!(
        "{} tgflow running, uptime {}",
        "●".green(),
        format_uptime(health.uptime_secs)
    );
    if let Some(stats) = stats {
        println!("  pending   {}", stats.pending);
        println!("  sending   {}", stats.sending);
        println!("  retrying  {}", stats.retrying);
        println!("  sent      {} ({} today)", stats.sent, stats.sent_today);
        if stats.failed > 0 {
            println!("  failed    {}", stats.failed.to_string().red());
        } else {
            println!("  failed    0");
        }
        println!("  success   {:.1}%", stats.success_rate);
    }
    Ok(())
}

fn render_json(out: &StatusResponse) -> Result<String, TgflowError> {
    serde_json::to_string_pretty(out)
        .map_err(|e| TgflowError::Internal(format!("status serialization: {e}")))
}
