//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod deployment;
pub mod error;
pub mod event;
pub mod health;
pub mod target;

use axum::{
    Router,
    routing::{get, post},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::clients::{BuildService, JobRunService};

/// Shared handler state: database pool plus external dispatch clients
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub job_runs: Arc<dyn JobRunService>,
    pub builds: Arc<dyn BuildService>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Change feed trigger
        .route(
            "/event/deployment-created",
            post(event::deployment_created),
        )
        // Deployment endpoints
        .route("/deployment/create", post(deployment::create_deployment))
        .route("/deployment/list", get(deployment::list_deployments))
        .route("/deployment/{id}", get(deployment::get_deployment))
        .route(
            "/deployment/{id}/progress",
            post(deployment::report_progress),
        )
        .route(
            "/deployment/{id}/complete",
            post(deployment::complete_deployment),
        )
        // Target endpoints
        .route("/target/create", post(target::create_target))
        .route("/target/{id}", get(target::get_target))
        .route("/target/{id}/endpoint", post(target::set_endpoint))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
