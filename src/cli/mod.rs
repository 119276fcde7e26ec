//! CLI command definitions for taskboard
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod tasks;

use clap::{Parser, Subcommand};
use tasks::{AddArgs, DoneArgs};
use tracing_subscriber::EnvFilter;

/// Default server URL used by the client subcommands.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Task board server and client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Database name (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Server URL for client subcommands
    #[arg(short, long, global = true, default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Log filter for the subscriber.
    ///
    /// A valid `RUST_LOG` directive wins; otherwise `--verbose` picks debug
    /// over info.
    pub fn log_filter(&self, rust_log: Option<&str>) -> EnvFilter {
        if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
            match EnvFilter::try_new(directives) {
                Ok(filter) => return filter,
                Err(e) => eprintln!("Ignoring invalid RUST_LOG {directives:?}: {e}"),
            }
        }
        EnvFilter::new(if self.verbose { "debug" } else { "info" })
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default if no subcommand given)
    Serve,

    /// Show the most recent pending tasks
    List,

    /// Add a task
    Add(AddArgs),

    /// Mark a task as done
    Done(DoneArgs),

    /// Delete every task from the database (test support)
    Reset,
}
