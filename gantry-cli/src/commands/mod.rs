//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod deployment;
mod target;

pub use deployment::DeploymentCommands;
pub use target::TargetCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Deployment management
    Deployment {
        #[command(subcommand)]
        command: DeploymentCommands,
    },
    /// Target management
    Target {
        #[command(subcommand)]
        command: TargetCommands,
    },
    /// Deploy a target and wait for completion
    Deploy {
        /// Target ID to deploy
        target_id: String,

        /// Poll interval in seconds
        #[arg(long, default_value = "3")]
        poll_interval: u64,

        /// Give up after this many seconds
        #[arg(long, default_value = "900")]
        max_wait: u64,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Deployment { command } => {
            deployment::handle_deployment_command(command, config).await
        }
        Commands::Target { command } => target::handle_target_command(command, config).await,
        Commands::Deploy {
            target_id,
            poll_interval,
            max_wait,
        } => deployment::deploy_and_wait(config, &target_id, poll_interval, max_wait).await,
    }
}
