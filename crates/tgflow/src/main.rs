// SPDX-FileCopyrightText: 2026 Tgflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! tgflow - outbound Telegram send-queue daemon.
//!
//! This is the binary entry point for the tgflow daemon.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod serve;
mod status;

/// tgflow - outbound Telegram send-queue daemon.
#[derive(Parser, Debug)]
#[command(name = "tgflow", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the queue daemon and gateway.
    Serve,
    /// Query a running daemon for queue status.
    Status {
        /// Output machine-readable JSON.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match tgflow_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            tgflow_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("tgflow: use --help for available commands");
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("tgflow: {err}");
        std::process::exit(1);
    }
}

/// `tgflow config`: dump the merged configuration, defaults included.
fn print_config(config: &tgflow_config::TgflowConfig) -> Result<(), tgflow_core::TgflowError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| tgflow_core::TgflowError::Internal(format!("config serialization: {e}")))?;
    println!("{rendered}");
    Ok(())
}
