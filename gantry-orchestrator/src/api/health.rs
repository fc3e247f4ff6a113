//! Health Check API Handler
//!
//! Liveness endpoint for the orchestrator; answers before the database is
//! touched, so it reports process health only.

use axum::{Json, response::IntoResponse};

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "gantry-orchestrator",
    }))
}
