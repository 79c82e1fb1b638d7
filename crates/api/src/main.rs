//! MeetSched - meeting scheduling service
//!
//! Loads configuration, wires the application context and runs the status
//! sweep until interrupted. `--sweep-once` runs a single sweep and exits.

use anyhow::Context;
use meetsched_lib::utils::logging::init_tracing;
use meetsched_lib::{run_status_sweep, AppContext};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the subscriber so RUST_LOG from the file applies.
    let dotenv = dotenvy::dotenv();
    init_tracing();

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => warn!(error = %err, "no .env file loaded"),
    }

    let sweep_once = std::env::args().skip(1).any(|arg| arg == "--sweep-once");

    let config = meetsched_infra::config::load().context("failed to load configuration")?;
    let ctx = AppContext::new(config).await.context("failed to initialize application")?;
    info!(timezone = %ctx.config.scheduling.timezone, "MeetSched starting");

    if sweep_once {
        let report = run_status_sweep(&ctx).await.context("status sweep failed")?;
        info!(started = report.started, completed = report.completed, "one-shot sweep finished");
        return Ok(());
    }

    ctx.start_sweeper().await.context("failed to start status sweep")?;

    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    info!("shutdown signal received");

    ctx.shutdown().await;
    Ok(())
}
