//! Dispatch Service
//!
//! Turns a pending deployment record into running work: validates the target
//! configuration, then either starts an executor run on the job execution
//! service (agent targets) or submits a build to the build pipeline
//! (tool-server targets).
//!
//! Dispatch is fire-and-forget; completion is written to the record by the
//! executor run or by the build pipeline's completion callback. Any
//! validation or submission failure marks the record failed so event
//! redelivery never retries a case that cannot succeed.

use gantry_core::domain::deployment::{Deployment, DeploymentStatus};
use gantry_core::domain::target::{TargetKind, validate_for_deploy};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::clients::{BuildService, JobRunService};
use crate::repository::{deployment_repository, target_repository};

/// Service error type
#[derive(Debug)]
pub enum DispatchError {
    NotFound(Uuid),
    TargetNotFound(String),
    Validation(String),
    Submission(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for DispatchError {
    fn from(err: sqlx::Error) -> Self {
        DispatchError::DatabaseError(err)
    }
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::NotFound(id) => write!(f, "deployment {} not found", id),
            DispatchError::TargetNotFound(id) => write!(f, "target {} not found", id),
            DispatchError::Validation(msg) => write!(f, "validation failed: {}", msg),
            DispatchError::Submission(msg) => write!(f, "submission failed: {}", msg),
            DispatchError::DatabaseError(err) => write!(f, "database error: {}", err),
        }
    }
}

/// Outcome of a dispatch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Work was handed off; carries the job execution ref or build ID
    Dispatched(String),
    /// Record was not pending; redelivered event, nothing to do
    AlreadyHandled(DeploymentStatus),
}

/// Whether a record in this status should be dispatched
///
/// Event delivery is at-least-once; only a still-pending record dispatches.
/// Processing and terminal records no-op, which bounds double-dispatch under
/// redelivery.
pub fn should_dispatch(status: DeploymentStatus) -> bool {
    status == DeploymentStatus::Pending
}

/// Dispatch a deployment to its execution path
pub async fn dispatch(
    pool: &PgPool,
    job_runs: &Arc<dyn JobRunService>,
    builds: &Arc<dyn BuildService>,
    deployment_id: Uuid,
) -> Result<DispatchOutcome, DispatchError> {
    let deployment = deployment_repository::find_by_id(pool, deployment_id)
        .await?
        .ok_or(DispatchError::NotFound(deployment_id))?;

    if !should_dispatch(deployment.status) {
        tracing::info!(
            "Deployment {} already {}; skipping dispatch",
            deployment_id,
            deployment.status
        );
        return Ok(DispatchOutcome::AlreadyHandled(deployment.status));
    }

    let Some(target) = target_repository::find_by_id(pool, &deployment.target_id).await? else {
        let msg = format!("target {} not found", deployment.target_id);
        deployment_repository::mark_failed(pool, deployment_id, &msg).await?;
        tracing::warn!("Deployment {} failed: {}", deployment_id, msg);
        return Err(DispatchError::TargetNotFound(deployment.target_id.clone()));
    };

    if let Err(msg) = validate_for_deploy(&target) {
        deployment_repository::mark_failed(pool, deployment_id, &msg).await?;
        tracing::warn!("Deployment {} failed validation: {}", deployment_id, msg);
        return Err(DispatchError::Validation(msg));
    }

    match target.kind {
        TargetKind::Agent => dispatch_job_run(pool, job_runs, &deployment).await,
        TargetKind::ToolServer => {
            // Presence checked by validate_for_deploy
            let config_url = target.public_url.as_deref().unwrap_or_default();
            dispatch_build(pool, builds, &deployment, config_url).await
        }
    }
}

/// Start an isolated executor run for an agent target
async fn dispatch_job_run(
    pool: &PgPool,
    job_runs: &Arc<dyn JobRunService>,
    deployment: &Deployment,
) -> Result<DispatchOutcome, DispatchError> {
    match job_runs.start_run(deployment.id).await {
        Ok(execution_ref) => {
            let applied =
                deployment_repository::mark_job_dispatched(pool, deployment.id, &execution_ref)
                    .await?;

            if !applied {
                // Lost the race to a concurrent dispatch; the run that won
                // owns the record from here.
                tracing::warn!(
                    "Deployment {} was dispatched concurrently; run {} is redundant",
                    deployment.id,
                    execution_ref
                );
                return Ok(DispatchOutcome::AlreadyHandled(DeploymentStatus::Processing));
            }

            tracing::info!(
                "Deployment {} dispatched as run {}",
                deployment.id,
                execution_ref
            );
            Ok(DispatchOutcome::Dispatched(execution_ref))
        }
        Err(e) => {
            let msg = e.to_string();
            deployment_repository::mark_failed(pool, deployment.id, &msg).await?;
            tracing::error!("Deployment {} dispatch failed: {}", deployment.id, msg);
            Err(DispatchError::Submission(msg))
        }
    }
}

/// Submit a build-pipeline job for a tool-server target
async fn dispatch_build(
    pool: &PgPool,
    builds: &Arc<dyn BuildService>,
    deployment: &Deployment,
    config_url: &str,
) -> Result<DispatchOutcome, DispatchError> {
    match builds
        .submit_build(deployment.id, &deployment.target_id, config_url)
        .await
    {
        Ok(build_id) => {
            let applied =
                deployment_repository::mark_build_submitted(pool, deployment.id, &build_id)
                    .await?;

            if !applied {
                tracing::warn!(
                    "Deployment {} was dispatched concurrently; build {} is redundant",
                    deployment.id,
                    build_id
                );
                return Ok(DispatchOutcome::AlreadyHandled(DeploymentStatus::Processing));
            }

            tracing::info!(
                "Deployment {} submitted as build {}",
                deployment.id,
                build_id
            );
            Ok(DispatchOutcome::Dispatched(build_id))
        }
        Err(e) => {
            let msg = e.to_string();
            deployment_repository::mark_failed(pool, deployment.id, &msg).await?;
            tracing::error!(
                "Deployment {} build submission failed: {}",
                deployment.id,
                msg
            );
            Err(DispatchError::Submission(msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_dispatches() {
        assert!(should_dispatch(DeploymentStatus::Pending));
        assert!(!should_dispatch(DeploymentStatus::Processing));
        assert!(!should_dispatch(DeploymentStatus::Deployed));
        assert!(!should_dispatch(DeploymentStatus::Failed));
    }
}
