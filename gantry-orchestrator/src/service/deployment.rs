//! Deployment Service
//!
//! Business logic for deployment record lifecycle: creation, reads for the
//! client-facing poll loop, progress reporting, and terminal transitions.
//!
//! The underlying repository refuses writes to terminal records, so every
//! mutation here reports whether it was applied; callers racing a concurrent
//! executor observe a clean no-op instead of a clobbered record.

use gantry_core::domain::deployment::{Deployment, DeploymentStatus, clamp_progress};
use gantry_core::dto::deployment::CompleteDeployment;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{deployment_repository, target_repository};

/// Service error type
#[derive(Debug)]
pub enum DeploymentError {
    NotFound(Uuid),
    TargetNotFound(String),
    ValidationError(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for DeploymentError {
    fn from(err: sqlx::Error) -> Self {
        DeploymentError::DatabaseError(err)
    }
}

/// Create a new deployment record for a target
///
/// The record starts in pending; the change feed picks it up from there.
/// Every redeploy is a fresh record, never a mutation of an old one.
pub async fn create_deployment(
    pool: &PgPool,
    target_id: &str,
) -> Result<Deployment, DeploymentError> {
    let target = target_repository::find_by_id(pool, target_id)
        .await?
        .ok_or_else(|| DeploymentError::TargetNotFound(target_id.to_string()))?;

    let deployment = deployment_repository::create(pool, target_id, target.kind).await?;

    tracing::info!(
        "Deployment {} created for target {} ({})",
        deployment.id,
        target_id,
        target.kind
    );

    Ok(deployment)
}

/// Get a deployment by ID
pub async fn get_deployment(pool: &PgPool, id: Uuid) -> Result<Deployment, DeploymentError> {
    let deployment = deployment_repository::find_by_id(pool, id)
        .await?
        .ok_or(DeploymentError::NotFound(id))?;

    Ok(deployment)
}

/// List all deployments
pub async fn list_deployments(pool: &PgPool) -> Result<Vec<Deployment>, DeploymentError> {
    let deployments = deployment_repository::list_all(pool).await?;
    Ok(deployments)
}

/// Record progress on a non-terminal deployment
///
/// Returns whether the update was applied; a `false` means the record had
/// already reached a terminal state and the caller should stand down.
pub async fn report_progress(
    pool: &PgPool,
    id: Uuid,
    progress_percentage: i32,
    current_step: &str,
) -> Result<bool, DeploymentError> {
    // Missing IDs surface as 404, not a no-op
    let current = deployment_repository::find_by_id(pool, id)
        .await?
        .ok_or(DeploymentError::NotFound(id))?;

    if !current.status.can_transition(DeploymentStatus::Processing) {
        tracing::warn!(
            "Progress update for deployment {} ignored; record is {}",
            id,
            current.status
        );
        return Ok(false);
    }

    // The repository guard re-checks under the write, covering the window
    // between this read and the UPDATE
    let applied = deployment_repository::update_progress(
        pool,
        id,
        clamp_progress(progress_percentage),
        current_step,
    )
    .await?;

    if !applied {
        tracing::warn!(
            "Progress update for deployment {} ignored; record is terminal",
            id
        );
    }

    Ok(applied)
}

/// What a completion request may do given the record's current status
#[derive(Debug, PartialEq, Eq)]
enum CompletionCheck {
    Apply,
    AlreadyTerminal,
    Invalid(String),
}

/// Validate a requested completion against the state machine
///
/// Terminal records absorb the request (no-op); a non-terminal record only
/// accepts transitions the status machine permits.
fn completion_check(current: DeploymentStatus, requested: DeploymentStatus) -> CompletionCheck {
    if !requested.is_terminal() {
        return CompletionCheck::Invalid(format!("invalid completion status: {}", requested));
    }

    if current.is_terminal() {
        return CompletionCheck::AlreadyTerminal;
    }

    if !current.can_transition(requested) {
        return CompletionCheck::Invalid(format!(
            "cannot complete a {} deployment as {}",
            current, requested
        ));
    }

    CompletionCheck::Apply
}

/// Apply a terminal transition to a deployment
///
/// Validates the requested status against the transition rules and its
/// payload, then writes it with the repository's terminal guard. Returns
/// whether the transition was applied.
pub async fn complete_deployment(
    pool: &PgPool,
    id: Uuid,
    req: CompleteDeployment,
) -> Result<bool, DeploymentError> {
    let current = deployment_repository::find_by_id(pool, id)
        .await?
        .ok_or(DeploymentError::NotFound(id))?;

    match completion_check(current.status, req.status) {
        CompletionCheck::Invalid(msg) => return Err(DeploymentError::ValidationError(msg)),
        CompletionCheck::AlreadyTerminal => {
            tracing::warn!(
                "Completion of deployment {} ignored; record is already {}",
                id,
                current.status
            );
            return Ok(false);
        }
        CompletionCheck::Apply => {}
    }

    let applied = match req.status {
        DeploymentStatus::Deployed => {
            let service_url = req.service_url.as_deref().filter(|s| !s.is_empty()).ok_or(
                DeploymentError::ValidationError(
                    "deployed transition requires a service_url".to_string(),
                ),
            )?;
            deployment_repository::mark_deployed(pool, id, service_url).await?
        }
        DeploymentStatus::Failed => {
            let error_message = req
                .error_message
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or("deployment failed");
            deployment_repository::mark_failed(pool, id, error_message).await?
        }
        other => {
            return Err(DeploymentError::ValidationError(format!(
                "invalid completion status: {}",
                other
            )));
        }
    };

    if applied {
        tracing::info!("Deployment {} completed with status {}", id, req.status);
    } else {
        tracing::warn!(
            "Completion of deployment {} ignored; record is already terminal",
            id
        );
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_applies_on_processing_record() {
        assert_eq!(
            completion_check(DeploymentStatus::Processing, DeploymentStatus::Deployed),
            CompletionCheck::Apply
        );
        assert_eq!(
            completion_check(DeploymentStatus::Processing, DeploymentStatus::Failed),
            CompletionCheck::Apply
        );
    }

    #[test]
    fn test_pending_record_can_fail_but_not_deploy() {
        assert_eq!(
            completion_check(DeploymentStatus::Pending, DeploymentStatus::Failed),
            CompletionCheck::Apply
        );
        assert!(matches!(
            completion_check(DeploymentStatus::Pending, DeploymentStatus::Deployed),
            CompletionCheck::Invalid(_)
        ));
    }

    #[test]
    fn test_terminal_record_refuses_completion() {
        for current in [DeploymentStatus::Deployed, DeploymentStatus::Failed] {
            for requested in [DeploymentStatus::Deployed, DeploymentStatus::Failed] {
                assert_eq!(
                    completion_check(current, requested),
                    CompletionCheck::AlreadyTerminal
                );
            }
        }
    }

    #[test]
    fn test_non_terminal_completion_status_rejected() {
        for requested in [DeploymentStatus::Pending, DeploymentStatus::Processing] {
            assert!(matches!(
                completion_check(DeploymentStatus::Processing, requested),
                CompletionCheck::Invalid(_)
            ));
        }
    }
}
