//! Deployment DTOs for inter-service communication

use serde::{Deserialize, Serialize};

use crate::domain::deployment::DeploymentStatus;

/// Request to create a new deployment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeployment {
    pub target_id: String,
}

/// Progress report from the executor to the orchestrator
///
/// Applied only while the record is non-terminal; progress never moves
/// backwards at the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub progress_percentage: i32,
    pub current_step: String,
}

/// Terminal transition request
///
/// `status` must be `deployed` or `failed`. `service_url` accompanies a
/// deployed transition, `error_message` a failed one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteDeployment {
    pub status: DeploymentStatus,
    pub service_url: Option<String>,
    pub error_message: Option<String>,
}
