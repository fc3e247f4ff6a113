//! Target command handlers
//!
//! Handles target-related CLI commands: creation and viewing details.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use gantry_core::domain::target::{Target, TargetKind};
use gantry_core::dto::target::CreateTarget;

use crate::config::Config;
use gantry_client::OrchestratorClient;

/// Target subcommands
#[derive(Subcommand)]
pub enum TargetCommands {
    /// Create a new target
    Create {
        /// Target ID
        id: String,

        /// Display name (defaults to the ID)
        #[arg(short, long)]
        name: Option<String>,

        /// Target kind: agent or tool-server
        #[arg(short, long, default_value = "agent")]
        kind: String,

        /// System prompt (agent targets)
        #[arg(long)]
        system_prompt: Option<String>,

        /// Model selection (agent targets)
        #[arg(long)]
        model: Option<String>,

        /// Public config URL (tool-server targets)
        #[arg(long)]
        public_url: Option<String>,
    },
    /// Get target details
    Get {
        /// Target ID
        id: String,
    },
}

/// Handle target commands
pub async fn handle_target_command(command: TargetCommands, config: &Config) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);

    match command {
        TargetCommands::Create {
            id,
            name,
            kind,
            system_prompt,
            model,
            public_url,
        } => {
            create_target(&client, id, name, &kind, system_prompt, model, public_url).await
        }
        TargetCommands::Get { id } => get_target(&client, &id).await,
    }
}

/// Create a new target record
async fn create_target(
    client: &OrchestratorClient,
    id: String,
    name: Option<String>,
    kind: &str,
    system_prompt: Option<String>,
    model: Option<String>,
    public_url: Option<String>,
) -> Result<()> {
    let kind = match kind {
        "agent" => TargetKind::Agent,
        "tool-server" => TargetKind::ToolServer,
        other => anyhow::bail!("unknown target kind '{}' (expected agent or tool-server)", other),
    };

    let name = name.unwrap_or_else(|| id.clone());

    let target = client
        .create_target(CreateTarget {
            id,
            name,
            kind,
            system_prompt,
            model,
            integrations: serde_json::json!({}),
            public_url,
        })
        .await
        .context("Failed to create target")?;

    println!("{}", "✓ Target created".green().bold());
    println!("  ID:   {}", target.id.cyan());
    println!("  Kind: {}", target.kind);

    Ok(())
}

/// Show target details
async fn get_target(client: &OrchestratorClient, id: &str) -> Result<()> {
    let target = client
        .get_target(id)
        .await
        .context("Failed to fetch target")?;

    print_target_details(&target);
    Ok(())
}

/// Print detailed target information
fn print_target_details(target: &Target) {
    println!("{}", "Target Details:".bold());
    println!("  ID:   {}", target.id.cyan());
    println!("  Name: {}", target.name);
    println!("  Kind: {}", target.kind);

    if let Some(model) = &target.model {
        println!("  Model: {}", model);
    }

    if let Some(url) = &target.public_url {
        println!("  Config URL: {}", url);
    }

    if let Some(url) = &target.service_url {
        println!("\n{}", "Live Endpoint:".bold());
        println!("  {}", url.green());
        if let Some(deployment_id) = target.last_deployment_id {
            println!("  Deployed by: {}", deployment_id.to_string().dimmed());
        }
    } else {
        println!("\n  {}", "Not deployed yet.".yellow());
    }
}
