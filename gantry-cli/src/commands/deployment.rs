//! Deployment command handlers
//!
//! Handles deployment-related CLI commands: creating deployments, viewing
//! status, listing, and the deploy-and-wait poll loop.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use gantry_core::domain::deployment::{Deployment, DeploymentStatus};
use uuid::Uuid;

use crate::config::Config;
use gantry_client::OrchestratorClient;

/// Deployment subcommands
#[derive(Subcommand)]
pub enum DeploymentCommands {
    /// Create a deployment without waiting for it
    Create {
        /// Target ID to deploy
        target_id: String,
    },
    /// Get deployment status
    Status {
        /// Deployment ID
        id: Uuid,
    },
    /// List all deployments
    List,
}

/// Handle deployment commands
///
/// Routes deployment subcommands to their respective handlers.
pub async fn handle_deployment_command(
    command: DeploymentCommands,
    config: &Config,
) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);

    match command {
        DeploymentCommands::Create { target_id } => create_deployment(&client, &target_id).await,
        DeploymentCommands::Status { id } => show_status(&client, id).await,
        DeploymentCommands::List => list_deployments(&client).await,
    }
}

/// Create a deployment record and return immediately
async fn create_deployment(client: &OrchestratorClient, target_id: &str) -> Result<()> {
    let deployment = client
        .create_deployment(target_id)
        .await
        .context("Failed to create deployment")?;

    println!("{}", "✓ Deployment created".green().bold());
    println!("  ID:     {}", deployment.id.to_string().cyan());
    println!("  Target: {}", deployment.target_id);
    println!();
    println!(
        "Track it with {}",
        format!("gantry deployment status {}", deployment.id).cyan()
    );

    Ok(())
}

/// Show the current status of a deployment
async fn show_status(client: &OrchestratorClient, id: Uuid) -> Result<()> {
    let deployment = client
        .get_deployment(id)
        .await
        .context("Failed to fetch deployment")?;

    print_deployment_details(&deployment);
    Ok(())
}

/// List all deployments
async fn list_deployments(client: &OrchestratorClient) -> Result<()> {
    let deployments = client
        .list_deployments()
        .await
        .context("Failed to list deployments")?;

    if deployments.is_empty() {
        println!("{}", "No deployments found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} deployment(s):", deployments.len()).bold());
    println!();
    for deployment in deployments {
        print_deployment_summary(&deployment);
    }

    Ok(())
}

/// Create a deployment and poll until it reaches a terminal state
pub async fn deploy_and_wait(
    config: &Config,
    target_id: &str,
    poll_interval: u64,
    max_wait: u64,
) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);

    let deployment = client
        .create_deployment(target_id)
        .await
        .context("Failed to create deployment")?;

    println!(
        "{} deployment {} for target {}",
        "Started".bold(),
        deployment.id.to_string().cyan(),
        target_id
    );

    let final_state = client
        .wait_for_completion(
            deployment.id,
            Duration::from_secs(poll_interval),
            Duration::from_secs(max_wait),
        )
        .await
        .context("Polling for completion failed")?;

    println!();
    print_deployment_details(&final_state);

    match final_state.status {
        DeploymentStatus::Deployed => Ok(()),
        _ => anyhow::bail!(
            "deployment {} ended as {}",
            final_state.id,
            final_state.status
        ),
    }
}

/// Print a deployment summary line
fn print_deployment_summary(deployment: &Deployment) {
    println!(
        "  {} Deployment {}",
        "▸".cyan(),
        deployment.id.to_string().dimmed()
    );
    println!("    Target:   {}", deployment.target_id);
    println!("    Status:   {}", colorize_status(deployment.status));
    println!(
        "    Created:  {}",
        deployment
            .created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

/// Print detailed deployment information
fn print_deployment_details(deployment: &Deployment) {
    println!("{}", "Deployment Details:".bold());
    println!("  ID:        {}", deployment.id.to_string().cyan());
    println!("  Target:    {}", deployment.target_id);
    println!("  Status:    {}", colorize_status(deployment.status));
    println!(
        "  Progress:  {}% ({})",
        deployment.progress_percentage, deployment.current_step
    );
    println!(
        "  Created:   {}",
        deployment.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    if let Some(completed) = deployment.completed_at {
        println!("  Completed: {}", completed.format("%Y-%m-%d %H:%M:%S"));

        let duration = completed.signed_duration_since(deployment.created_at);
        println!("  Duration:  {}s", duration.num_seconds());
    }

    if let Some(reference) = &deployment.job_execution_ref {
        println!("  Run:       {}", reference.dimmed());
    }

    if let Some(build_id) = &deployment.build_id {
        println!("  Build:     {}", build_id.dimmed());
    }

    if let Some(url) = &deployment.service_url {
        println!("\n{}", "Service URL:".bold());
        println!("  {}", url.green());
    }

    if let Some(error) = &deployment.error_message {
        println!("\n{}", "Error:".bold());
        println!("  {}", error.red());
    }
}

/// Colorize deployment status for display
fn colorize_status(status: DeploymentStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        DeploymentStatus::Pending => status_str.yellow(),
        DeploymentStatus::Processing => status_str.cyan(),
        DeploymentStatus::Deployed => status_str.green(),
        DeploymentStatus::Failed => status_str.red(),
    }
}
