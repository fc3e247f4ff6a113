//! Deployment domain types
//!
//! Structure shared between orchestrator (persists) and executor (updates).
//! The deployment record is the sole source of truth for the progress of one
//! provisioning attempt. Redeploys create a new record; terminal records are
//! never mutated.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::target::TargetKind;

/// Deployment status record
///
/// One record exists per deployment attempt, keyed by a generated id that
/// doubles as the idempotency token for event dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: Uuid,
    pub target_id: String,
    pub target_kind: TargetKind,
    pub status: DeploymentStatus,
    /// 0-100, never decreases while the record is non-terminal
    pub progress_percentage: i32,
    /// Human-readable description of the active phase
    pub current_step: String,
    /// Set once, only when the record fails
    pub error_message: Option<String>,
    /// Opaque reference to the underlying job run, set once dispatch succeeds
    pub job_execution_ref: Option<String>,
    /// Opaque reference to the underlying build, set once submission succeeds
    pub build_id: Option<String>,
    /// Set if and only if status is Deployed
    pub service_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Set exactly once, on the first terminal transition
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Deployment {
    /// Whether the record has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Deployment lifecycle status
///
/// Transitions are monotonic along `pending -> processing -> {deployed | failed}`.
/// Only `status` is authoritative for completion; progress is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Pending,
    Processing,
    Deployed,
    Failed,
}

impl DeploymentStatus {
    /// Whether this status permits no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, DeploymentStatus::Deployed | DeploymentStatus::Failed)
    }

    /// Whether a transition from `self` to `to` is permitted
    ///
    /// Encodes the monotone state machine: terminal states absorb everything,
    /// `pending` may only move forward, and failure is reachable from any
    /// non-terminal state.
    pub fn can_transition(self, to: DeploymentStatus) -> bool {
        match (self, to) {
            (DeploymentStatus::Pending, DeploymentStatus::Processing) => true,
            (DeploymentStatus::Pending, DeploymentStatus::Failed) => true,
            (DeploymentStatus::Processing, DeploymentStatus::Processing) => true,
            (DeploymentStatus::Processing, DeploymentStatus::Deployed) => true,
            (DeploymentStatus::Processing, DeploymentStatus::Failed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeploymentStatus::Pending => "pending",
            DeploymentStatus::Processing => "processing",
            DeploymentStatus::Deployed => "deployed",
            DeploymentStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Clamp a reported progress value into the valid 0-100 range
pub fn clamp_progress(value: i32) -> i32 {
    value.clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!DeploymentStatus::Pending.is_terminal());
        assert!(!DeploymentStatus::Processing.is_terminal());
        assert!(DeploymentStatus::Deployed.is_terminal());
        assert!(DeploymentStatus::Failed.is_terminal());
    }

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(DeploymentStatus::Pending.can_transition(DeploymentStatus::Processing));
        assert!(DeploymentStatus::Processing.can_transition(DeploymentStatus::Processing));
        assert!(DeploymentStatus::Processing.can_transition(DeploymentStatus::Deployed));
        assert!(DeploymentStatus::Processing.can_transition(DeploymentStatus::Failed));
        assert!(DeploymentStatus::Pending.can_transition(DeploymentStatus::Failed));
    }

    #[test]
    fn test_terminal_states_absorb() {
        for to in [
            DeploymentStatus::Pending,
            DeploymentStatus::Processing,
            DeploymentStatus::Deployed,
            DeploymentStatus::Failed,
        ] {
            assert!(!DeploymentStatus::Deployed.can_transition(to));
            assert!(!DeploymentStatus::Failed.can_transition(to));
        }
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!DeploymentStatus::Processing.can_transition(DeploymentStatus::Pending));
        assert!(!DeploymentStatus::Pending.can_transition(DeploymentStatus::Deployed));
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&DeploymentStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");

        let status: DeploymentStatus = serde_json::from_str("\"deployed\"").unwrap();
        assert_eq!(status, DeploymentStatus::Deployed);
    }

    #[test]
    fn test_clamp_progress() {
        assert_eq!(clamp_progress(-5), 0);
        assert_eq!(clamp_progress(42), 42);
        assert_eq!(clamp_progress(150), 100);
    }
}
