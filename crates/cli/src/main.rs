// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `warden` - unified plugin supervisor CLI with process and container
//! backends. The agent invokes this binary only; it never talks to the
//! container runtime directly.

mod commands;
mod exit_error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use output::OutputFormat;
use warden_runtime::Runtime;

#[derive(Parser)]
#[command(
    name = "warden",
    version,
    about = "Supervise plugin workloads under process or container isolation"
)]
struct Cli {
    /// Runtime root directory (required by every command)
    #[arg(short = 'r', long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a plugin and keep it alive (restarts on crash)
    Run(commands::run::RunArgs),
    /// Stop a plugin without removing it
    Stop {
        /// Plugin ID
        #[arg(long)]
        plugin_id: String,
    },
    /// Stop a plugin and remove its work dir and state
    Delete {
        /// Plugin ID
        #[arg(long)]
        plugin_id: String,
    },
    /// Stop and remove every plugin
    Destroy,
    /// List all plugins and their status
    List {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show a single plugin's state
    State {
        /// Plugin ID
        #[arg(long)]
        plugin_id: String,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Stream a plugin's log to stdout
    Log(commands::log::LogArgs),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli).await {
        match err.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("{exit}");
                std::process::exit(exit.code);
            }
            None => {
                eprintln!("{err:#}");
                std::process::exit(1);
            }
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let root = must_root(cli.root)?;
    let runtime = Runtime::new(&root);
    match cli.command {
        Command::Run(args) => commands::run::run(&root, &runtime, args).await,
        Command::Stop { plugin_id } => commands::lifecycle::stop(&runtime, &plugin_id).await,
        Command::Delete { plugin_id } => commands::lifecycle::delete(&runtime, &plugin_id).await,
        Command::Destroy => commands::lifecycle::destroy(&runtime).await,
        Command::List { format } => commands::query::list(&runtime, format).await,
        Command::State { plugin_id, format } => {
            commands::query::state(&runtime, &plugin_id, format).await
        }
        Command::Log(args) => commands::log::log(&runtime, args).await,
    }
}

/// Exit code 2 when `--root` is missing, before any other work happens.
fn must_root(root: Option<PathBuf>) -> Result<PathBuf, ExitError> {
    root.ok_or_else(|| ExitError::new(2, "must specify --root"))
}

/// Operational logs go to stderr so stdout stays a clean data channel for
/// list/state/log output.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
