//! Deployment run driver
//!
//! A single run processes exactly one deployment end-to-end and exits. All
//! state lives in the deployment record at the orchestrator; the run itself
//! is stateless between writes, and its writes are strictly ordered because
//! the run is single-threaded.
//!
//! The job execution service does not guarantee single-instance execution,
//! so the run checks for a terminal record before starting and again before
//! the long deploy step; the store additionally refuses writes to terminal
//! records. That bounds, not eliminates, duplicate-execution races.

use anyhow::{Context, Result};
use gantry_client::OrchestratorClient;
use gantry_core::domain::target::validate_for_deploy;
use tracing::{info, warn};

use crate::config::Config;
use crate::deploy;

/// Progress checkpoints for the run's phases
const PROGRESS_VALIDATING: i32 = 5;
const PROGRESS_DEPLOYING: i32 = 30;
const PROGRESS_PUBLISHING: i32 = 85;

/// Drive one deployment to a terminal state
///
/// Returns an error only for failures that should also fail the process;
/// a record found already terminal is a clean no-op.
pub async fn run(config: &Config, client: &OrchestratorClient) -> Result<()> {
    let deployment_id = config.deployment_id;

    let deployment = client
        .get_deployment(deployment_id)
        .await
        .context("Failed to load deployment record")?;

    if deployment.is_terminal() {
        info!(
            "Deployment {} is already {}; nothing to do",
            deployment_id, deployment.status
        );
        return Ok(());
    }

    client
        .report_progress(deployment_id, PROGRESS_VALIDATING, "validating configuration")
        .await
        .context("Failed to report validation progress")?;

    let target = client
        .get_target(&deployment.target_id)
        .await
        .with_context(|| format!("Failed to load target {}", deployment.target_id))?;

    if let Err(msg) = validate_for_deploy(&target) {
        anyhow::bail!("{}", msg);
    }

    // Cooperative re-check before the long deploy step: a concurrent run may
    // have finished the record while we were validating.
    let deployment = client
        .get_deployment(deployment_id)
        .await
        .context("Failed to re-load deployment record")?;
    if deployment.is_terminal() {
        info!(
            "Deployment {} became {} during validation; standing down",
            deployment_id, deployment.status
        );
        return Ok(());
    }

    client
        .report_progress(deployment_id, PROGRESS_DEPLOYING, "running deploy")
        .await
        .context("Failed to report deploy progress")?;

    let output =
        deploy::run_deploy_command(&config.deploy_command, deployment_id, &target.id).await?;

    let service_url = deploy::resolve_service_url(
        &output,
        &config.url_prefix,
        &target.id,
        &config.project_number,
        &config.region,
    );

    client
        .report_progress(deployment_id, PROGRESS_PUBLISHING, "publishing endpoint")
        .await
        .context("Failed to report publish progress")?;

    client
        .complete_deployed(deployment_id, &service_url)
        .await
        .context("Failed to mark deployment as deployed")?;

    // Reflect the live endpoint on the target record itself so future reads
    // of the target don't need deployment history.
    if let Err(e) = client
        .set_target_endpoint(&target.id, &service_url, deployment_id)
        .await
    {
        // The deployment itself succeeded; a stale target endpoint is
        // recoverable on the next deploy, so log and keep the success.
        warn!(
            "Deployment {} succeeded but publishing endpoint on target {} failed: {}",
            deployment_id, target.id, e
        );
    }

    info!(
        "Deployment {} completed: {} is live at {}",
        deployment_id, target.id, service_url
    );

    Ok(())
}
