//! Target DTOs for inter-service communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::target::TargetKind;

/// Request to create a new target record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTarget {
    pub id: String,
    pub name: String,
    pub kind: TargetKind,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub integrations: serde_json::Value,
    pub public_url: Option<String>,
}

/// Endpoint publication from the executor after a successful deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetEndpoint {
    pub service_url: String,
    pub deployment_id: Uuid,
}
