//! Target domain types
//!
//! A target is the resource being provisioned: either a primary agent
//! service or a secondary tool server attached to one. The target record
//! carries the configuration blob the executor validates before dispatch,
//! plus the live-endpoint fields that are refreshed after each successful
//! deployment.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of resource being deployed
///
/// Selects the dispatch path: agents run through the job execution service,
/// tool servers are submitted to the external build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    Agent,
    ToolServer,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::Agent => write!(f, "agent"),
            TargetKind::ToolServer => write!(f, "tool-server"),
        }
    }
}

/// Target record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub kind: TargetKind,
    /// System behavior for agent targets
    pub system_prompt: Option<String>,
    /// Model selection for agent targets
    pub model: Option<String>,
    /// Integration endpoints and other free-form configuration
    pub integrations: serde_json::Value,
    /// Source config URL for tool-server targets; required before dispatch
    pub public_url: Option<String>,
    /// Live endpoint, refreshed on each successful deployment
    pub service_url: Option<String>,
    /// Back-reference to the deployment that published the current endpoint
    pub last_deployment_id: Option<Uuid>,
    /// Mirror of the last deployment outcome, for reads of the target itself
    pub deployment_status: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Validate that a target carries everything its dispatch path requires
///
/// Returns a message naming the missing field so it can be surfaced verbatim
/// as the deployment's error_message.
pub fn validate_for_deploy(target: &Target) -> Result<(), String> {
    match target.kind {
        TargetKind::Agent => {
            if target
                .system_prompt
                .as_deref()
                .is_none_or(|s| s.trim().is_empty())
            {
                return Err(format!(
                    "agent target {} is missing a system_prompt",
                    target.id
                ));
            }
            if target.model.as_deref().is_none_or(|s| s.trim().is_empty()) {
                return Err(format!("agent target {} is missing a model", target.id));
            }
        }
        TargetKind::ToolServer => {
            if target
                .public_url
                .as_deref()
                .is_none_or(|s| s.trim().is_empty())
            {
                return Err(format!(
                    "tool-server target {} is missing a public_url",
                    target.id
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_target() -> Target {
        Target {
            id: "agentA".to_string(),
            name: "Agent A".to_string(),
            kind: TargetKind::Agent,
            system_prompt: Some("You are a helpful assistant.".to_string()),
            model: Some("claude-sonnet".to_string()),
            integrations: serde_json::json!({}),
            public_url: None,
            service_url: None,
            last_deployment_id: None,
            deployment_status: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_valid_agent_passes() {
        assert!(validate_for_deploy(&agent_target()).is_ok());
    }

    #[test]
    fn test_agent_missing_system_prompt() {
        let mut target = agent_target();
        target.system_prompt = None;

        let err = validate_for_deploy(&target).unwrap_err();
        assert!(err.contains("system_prompt"));
        assert!(err.contains("agentA"));
    }

    #[test]
    fn test_agent_blank_system_prompt() {
        let mut target = agent_target();
        target.system_prompt = Some("   ".to_string());

        assert!(validate_for_deploy(&target).is_err());
    }

    #[test]
    fn test_agent_missing_model() {
        let mut target = agent_target();
        target.model = None;

        let err = validate_for_deploy(&target).unwrap_err();
        assert!(err.contains("model"));
    }

    #[test]
    fn test_tool_server_requires_public_url() {
        let mut target = agent_target();
        target.kind = TargetKind::ToolServer;
        target.public_url = None;

        let err = validate_for_deploy(&target).unwrap_err();
        assert!(err.contains("public_url"));

        target.public_url = Some("https://tools.example.com/config.json".to_string());
        assert!(validate_for_deploy(&target).is_ok());
    }

    #[test]
    fn test_kind_serde_kebab_case() {
        let json = serde_json::to_string(&TargetKind::ToolServer).unwrap();
        assert_eq!(json, "\"tool-server\"");
    }
}
