//! Deployment API Handlers
//!
//! HTTP endpoints for deployment record lifecycle: creation, the
//! client-facing poll reads, and the executor's status writes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use gantry_core::domain::deployment::Deployment;
use gantry_core::dto::deployment::{CompleteDeployment, CreateDeployment, ProgressUpdate};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::deployment_service;

/// POST /deployment/create
/// Create a new pending deployment record for a target
pub async fn create_deployment(
    State(state): State<AppState>,
    Json(req): Json<CreateDeployment>,
) -> ApiResult<Json<Deployment>> {
    tracing::info!("Creating deployment for target: {}", req.target_id);

    let deployment = deployment_service::create_deployment(&state.pool, &req.target_id)
        .await?;

    Ok(Json(deployment))
}

/// GET /deployment/{id}
/// Get deployment details by ID (the poll loop's read)
pub async fn get_deployment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Deployment>> {
    tracing::debug!("Getting deployment: {}", id);

    let deployment = deployment_service::get_deployment(&state.pool, id)
        .await?;

    Ok(Json(deployment))
}

/// GET /deployment/list
/// List all deployments
pub async fn list_deployments(State(state): State<AppState>) -> ApiResult<Json<Vec<Deployment>>> {
    tracing::debug!("Listing all deployments");

    let deployments = deployment_service::list_deployments(&state.pool)
        .await?;

    Ok(Json(deployments))
}

/// POST /deployment/{id}/progress
/// Record executor progress on a non-terminal deployment
///
/// Answers 204 whether or not the write applied; a terminal record makes
/// this a no-op by design and the executor learns that from its next read.
pub async fn report_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProgressUpdate>,
) -> ApiResult<StatusCode> {
    tracing::debug!(
        "Progress for deployment {}: {}% ({})",
        id,
        req.progress_percentage,
        req.current_step
    );

    deployment_service::report_progress(&state.pool, id, req.progress_percentage, &req.current_step)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /deployment/{id}/complete
/// Apply a terminal transition to a deployment
pub async fn complete_deployment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteDeployment>,
) -> ApiResult<StatusCode> {
    tracing::info!("Completing deployment {} with status {}", id, req.status);

    deployment_service::complete_deployment(&state.pool, id, req)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
