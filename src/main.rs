//! Task Board
//!
//! Serves the task API over HTTP, or talks to a running server from the
//! command line.

use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::Path;
use taskboard::cli::{Cli, Command, tasks};
use taskboard::client::{HttpTaskApi, SyncController};
use taskboard::config::Config;
use taskboard::db::Database;
use taskboard::service::TaskService;
use taskboard::web;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Install the global tracing subscriber according to `--log`.
fn init_logging(cli: &Cli) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = cli.log_filter(rust_log.as_deref());
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut config = Config::resolve(cli.config.as_deref().map(Path::new))?;

    // CLI flags win over file and environment
    if let Some(name) = &cli.database {
        config.database.name = name.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let mut stdout = std::io::stdout();
    match cli.command {
        Some(Command::Serve) | None => run_server(config).await?,
        Some(Command::List) => {
            let controller = SyncController::new(HttpTaskApi::new(&cli.server));
            tasks::run_list(&controller, &mut stdout).await?;
        }
        Some(Command::Add(args)) => {
            let controller = SyncController::new(HttpTaskApi::new(&cli.server));
            tasks::run_add(&controller, args, &mut stdout).await?;
        }
        Some(Command::Done(args)) => {
            let controller = SyncController::new(HttpTaskApi::new(&cli.server));
            tasks::run_done(&controller, args, &mut stdout).await?;
        }
        Some(Command::Reset) => {
            let db = Database::open(&config.database)?;
            let removed = db.reset()?;
            info!(removed, "Task table reset");
            println!("Removed {removed} task(s)");
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    let db = Database::open(&config.database)?;
    info!(
        path = %config.database.db_path().display(),
        pool_size = db.pool_size(),
        "Database ready"
    );

    let service = TaskService::new(db);
    let addr = config.server.socket_addr()?;
    let server = web::start_server(service, addr).await?;

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl-C");
    server.shutdown().await;
    info!("Task board stopped");

    Ok(())
}
