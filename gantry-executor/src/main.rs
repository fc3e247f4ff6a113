//! Gantry Executor
//!
//! A single-shot worker that provisions one deployment and exits.
//!
//! Architecture:
//! - Configuration: DEPLOYMENT_ID and settings from the environment
//! - Client: HTTP communication with the orchestrator's status API
//! - Deploy: external deploy command invocation and endpoint parsing
//! - Run: the phase driver writing progress and the terminal transition
//!
//! The job execution service starts one run per dispatched deployment. Any
//! error is converted into a failed terminal transition on the record, and
//! the process exits non-zero. No retries happen inside a single run; a
//! retry is a new deployment record created by an external actor.

mod config;
mod deploy;
mod run;

use anyhow::Result;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use gantry_client::OrchestratorClient;

/// Bound on each status read/write against the orchestrator
const STATUS_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gantry_executor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Gantry Executor");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Loaded configuration: deployment_id={}, orchestrator_url={}",
        config.deployment_id, config.orchestrator_url
    );

    let client = match OrchestratorClient::with_timeout(
        config.orchestrator_url.clone(),
        STATUS_REQUEST_TIMEOUT,
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create orchestrator client: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = execute(&config, &client).await {
        error!("Deployment {} failed: {:#}", config.deployment_id, e);
        std::process::exit(1);
    }

    info!("Executor run finished");
}

/// Run the deployment, converting any error into a failed terminal transition
async fn execute(config: &Config, client: &OrchestratorClient) -> Result<()> {
    match run::run(config, client).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let message = format!("{:#}", e);

            // Best-effort: if this write fails too, the record stays in its
            // prior state and the stale-record sweep picks it up.
            if let Err(write_err) = client.complete_failed(config.deployment_id, &message).await {
                error!(
                    "Failed to write failure status for deployment {}: {:#}",
                    config.deployment_id, write_err
                );
            }

            Err(e)
        }
    }
}
