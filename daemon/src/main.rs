//! vector-daemon: voice command daemon for the V.E.C.T.O.R. portfolio assistant
//!
//! The page shim owns the browser speech APIs and the DOM; this daemon owns
//! the decisions:
//! - Recognition session gate (one session at a time, final results only)
//! - Command interpreter (project lookup, then an ordered rule cascade)
//! - Visual mode flags and the self-destruct countdown
//! - Timers for the countdown and flight HUD
//! - IPC server pushing page actions to subscribed shims

mod assistant;
mod cli;
mod config;
mod events;
mod interpreter;
mod ipc;
mod lifecycle;
mod recognition;
mod repl;
mod state;
mod timers;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::assistant::Assistant;
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::events::PageAction;
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;
use crate::timers::TimerDriver;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so the repl can keep stdout for actions
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(version = env!("CARGO_PKG_VERSION"), "vector-daemon starting");

    let config = Config::load(cli.config.as_deref())?;
    info!(
        projects = config.assistant.projects.len(),
        resumes = config.assistant.resumes.len(),
        "configuration loaded"
    );

    match cli.subcommand() {
        Commands::Repl => repl::run(config.assistant).await,
        Commands::Serve { socket } => serve(config, socket).await,
    }
}

async fn serve(config: Config, socket: Option<PathBuf>) -> Result<()> {
    config.ensure_dirs()?;
    let socket_path = socket.unwrap_or_else(|| config.socket_path.clone());

    let mut shutdown = ShutdownSignal::new()?;

    // Page shim / timers -> assistant
    let (input_tx, input_rx) = mpsc::channel(64);
    // Assistant -> timers, IPC subscribers, status snapshot
    let (action_tx, _) = broadcast::channel::<PageAction>(256);

    let mut assistant = Assistant::new(config.assistant.clone(), action_tx.clone());
    let timers = TimerDriver::new(input_tx.clone());
    let server = Server::new(&socket_path, input_tx, action_tx.clone())?;

    let timer_rx = action_tx.subscribe();
    let mut status_rx = action_tx.subscribe();
    let server_for_status = &server;

    info!("daemon initialized, entering main loop");

    tokio::select! {
        _ = assistant.run(input_rx) => {
            info!("assistant exited");
        }

        _ = timers.run(timer_rx) => {
            info!("timer driver exited");
        }

        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Keep the status snapshot in step with the action stream
        _ = async {
            loop {
                match status_rx.recv().await {
                    Ok(action) => {
                        if action == PageAction::CloseSession {
                            info!("page session closed by self destruct");
                        }
                        server_for_status.apply(&action).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "status receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("status handler exited");
        }

        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    info!("shutting down...");
    server.shutdown().await;
    info!("vector-daemon stopped");

    Ok(())
}
