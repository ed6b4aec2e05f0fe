//! Scopefs CLI - drive the scoped VFS host tools from a shell.
//!
//! Every command opens the VFS for one task and run (from config, the
//! environment or flags), performs its work and exits. Tool calls print the
//! same JSON envelope task code would receive.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;
mod formatter;

use commands::{call, export, tools, tree, watch};
use formatter::OutputFormat;

/// Scopefs - sandboxed, scope-partitioned file store for task execution
#[derive(Parser)]
#[command(name = "scopefs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a configuration file
    #[arg(short, long, global = true, env = "SCOPEFS_CONFIG")]
    config: Option<PathBuf>,

    /// Ecosystem root holding the scope directories
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Task id
    #[arg(long, global = true)]
    task: Option<String>,

    /// Run id
    #[arg(long, global = true)]
    run: Option<String>,

    /// Log every tool dispatch
    #[arg(long, global = true)]
    debug: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty (default) or json
    #[arg(long, global = true, default_value = "pretty")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke a host tool and print its envelope (use `watch` instead of watchFile)
    Call {
        /// Tool name (e.g. writeFile)
        tool: String,

        /// Parameters as a JSON object
        #[arg(short, long)]
        params: Option<String>,
    },

    /// List the available host tools
    Tools,

    /// Show every scope root with its size
    Tree,

    /// Copy the task's scope roots into a directory
    Export {
        /// Destination; files land under <dir>/tasks/<task>/<scope>
        dir: PathBuf,
    },

    /// Print changes to a path until interrupted
    Watch {
        /// Path relative to the scope root
        path: String,

        /// Scope of the path
        #[arg(short, long, default_value = "run")]
        scope: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let overrides = config_bridge::Overrides {
        root: cli.root.clone(),
        task: cli.task.clone(),
        run: cli.run.clone(),
        debug: cli.debug,
    };
    let config = config_bridge::load(cli.config.as_deref(), &overrides)?;

    let log_config = scopefs_telemetry::LogConfig::try_from(&config.logging)?.verbose(cli.verbose);
    if let Err(e) = scopefs_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let vfs = config_bridge::open_vfs(&config).await?;

    match cli.command {
        Commands::Call { tool, params } => {
            call::run_call(vfs, &tool, params.as_deref(), cli.format).await
        },
        Commands::Tools => tools::run_tools(vfs, cli.format),
        Commands::Tree => tree::run_tree(&vfs, cli.format).await,
        Commands::Export { dir } => export::run_export(&vfs, &dir, cli.format).await,
        Commands::Watch { path, scope } => {
            watch::run_watch(&vfs, &path, &scope, cli.format).await
        },
    }
}
