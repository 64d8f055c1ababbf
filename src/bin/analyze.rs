//! Run one weakness analysis from the command line.
//!
//! Usage:
//!   analyze [startup.json]
//!
//! Without an argument the built-in sample startup is analysed. The final
//! job record is printed as JSON. Configuration comes from the same
//! environment variables as the server.

use board_panel::config::AppConfig;
use board_panel::models::analysis::JobStatusResponse;
use board_panel::models::job::JobStatus;
use board_panel::models::startup::{sample_startup, StartupInput};
use board_panel::services::{
    crew::CrewClient, job_store::JobStore, orchestrator::Orchestrator, rate_limiter::RateLimiter,
    retry::RetryPolicy,
};
use garde::Validate;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let startup: StartupInput = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path = %path, "Loading startup data");
            serde_json::from_str(&std::fs::read_to_string(&path)?)?
        }
        None => {
            tracing::info!("No input file given, using sample startup");
            sample_startup()
        }
    };
    startup.validate()?;

    let store = Arc::new(JobStore::new());
    let orchestrator = Orchestrator::new(
        Arc::clone(&store),
        Arc::new(RateLimiter::new(
            config.rate_limit_requests,
            config.rate_limit_window(),
        )),
        Arc::new(CrewClient::new(&config)?),
        RetryPolicy {
            max_attempts: config.retry_max_attempts,
            base_delay: config.retry_base_delay(),
        },
    );

    let job = store.create();
    tracing::info!(job_id = %job.id, "Running board panel analysis");
    orchestrator.run(job.id, startup).await;

    let finished = store.get(job.id)?;
    let failed = finished.status == JobStatus::Failed;
    println!(
        "{}",
        serde_json::to_string_pretty(&JobStatusResponse::from(finished))?
    );

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
