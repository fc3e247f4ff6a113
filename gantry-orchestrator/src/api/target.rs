//! Target API Handlers
//!
//! HTTP endpoints for target records: creation, reads, and the executor's
//! endpoint publication after a successful deployment.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use gantry_core::domain::target::Target;
use gantry_core::dto::target::{CreateTarget, SetEndpoint};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::repository::target_repository;

/// POST /target/create
/// Create a new target record
pub async fn create_target(
    State(state): State<AppState>,
    Json(req): Json<CreateTarget>,
) -> ApiResult<Json<Target>> {
    tracing::info!("Creating target: {} ({})", req.id, req.kind);

    if req.id.trim().is_empty() {
        return Err(ApiError::BadRequest("target id cannot be empty".to_string()));
    }

    let target = target_repository::create(&state.pool, req).await?;

    Ok(Json(target))
}

/// GET /target/{id}
/// Get target details by ID
pub async fn get_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Target>> {
    tracing::debug!("Getting target: {}", id);

    let target = target_repository::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Target {} not found", id)))?;

    Ok(Json(target))
}

/// POST /target/{id}/endpoint
/// Publish the live endpoint on a target after a successful deployment
pub async fn set_endpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetEndpoint>,
) -> ApiResult<StatusCode> {
    tracing::info!(
        "Publishing endpoint {} on target {} (deployment {})",
        req.service_url,
        id,
        req.deployment_id
    );

    if req.service_url.trim().is_empty() {
        return Err(ApiError::BadRequest("service_url cannot be empty".to_string()));
    }

    let applied =
        target_repository::set_endpoint(&state.pool, &id, &req.service_url, req.deployment_id)
            .await?;

    if !applied {
        return Err(ApiError::NotFound(format!("Target {} not found", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
