//! Grid Miner
//!
//! A volunteer-computing client that fetches tasks from the Microgrid site,
//! computes them on a fixed pool of worker lanes and stores the results.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - Repositories: HTTP communication with the site (tasks, results)
//! - Services: The computation run on each task
//! - Scheduler: Worker lanes, dispatch, retries and shutdown
//!
//! The miner needs a session saved by `grid login` and runs until the
//! operator stops it or the site becomes unusable.

mod config;
mod repository;
mod scheduler;
mod service;
mod signal;

use anyhow::{Context, Result};
use grid_client::{MicrogridClient, Session};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repository::HttpTaskRepository;
use crate::scheduler::Miner;
use crate::service::TwinPrimeComputation;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grid_miner=info,grid_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Grid Miner");

    let config = load_config()?;
    info!(
        "Loaded configuration: base_url={}, project={}, workers={}",
        config.base_url, config.project, config.workers
    );

    let session = Session::load(&config.session_file)
        .await
        .with_context(|| {
            format!(
                "No usable session in {}, run `grid login` first",
                config.session_file.display()
            )
        })?;

    let client = MicrogridClient::new(&config.base_url).with_session(session);
    let repository = Arc::new(HttpTaskRepository::new(client, config.project));

    info!("Building sieve of {} primes", config.sieve_size);
    let computation = Arc::new(TwinPrimeComputation::new(config.sieve_size));

    let miner = Miner::new(&config, repository.clone(), repository, computation)?;

    match miner.run(signal::operator_signal()).await {
        Ok(summary) => {
            for lane in &summary.lanes {
                info!(
                    "  lane {}: {} computed, {} stored, average {:?}",
                    lane.lane, lane.computed, lane.stored, lane.average
                );
            }
            info!("Stored {} result(s) in total", summary.total_stored());
            Ok(())
        }
        Err(e) => {
            error!("Mining failed: {}", e);
            Err(e.into())
        }
    }
}

/// Loads and validates configuration from environment variables
///
/// Unset variables take their defaults; a malformed one stops the miner.
fn load_config() -> Result<Config> {
    Config::from_env().context("Invalid miner configuration")
}
