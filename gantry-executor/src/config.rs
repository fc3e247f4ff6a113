//! Executor configuration
//!
//! Each run of the executor processes exactly one deployment; the deployment
//! ID arrives through the environment as the run's sole required parameter,
//! injected by the job execution service.

use anyhow::Result;
use uuid::Uuid;

/// Executor configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// The deployment this run owns, end-to-end
    pub deployment_id: Uuid,

    /// Orchestrator base URL (e.g., "http://localhost:8080")
    pub orchestrator_url: String,

    /// External deploy command, invoked with (deployment_id, target_id)
    pub deploy_command: String,

    /// Service name prefix for the fallback URL template
    pub url_prefix: String,

    /// Project number for the fallback URL template
    pub project_number: String,

    /// Region for the fallback URL template
    pub region: String,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - DEPLOYMENT_ID (required)
    /// - ORCHESTRATOR_URL (optional, default: http://localhost:8080)
    /// - DEPLOY_COMMAND (optional, default: ./deploy.sh)
    /// - SERVICE_URL_PREFIX (optional, default: agent)
    /// - PROJECT_NUMBER (optional, default: 000000000000)
    /// - REGION (optional, default: us-central1)
    pub fn from_env() -> Result<Self> {
        let deployment_id = std::env::var("DEPLOYMENT_ID")
            .map_err(|_| anyhow::anyhow!("DEPLOYMENT_ID environment variable not set"))?;

        let deployment_id = Uuid::parse_str(&deployment_id)
            .map_err(|e| anyhow::anyhow!("DEPLOYMENT_ID is not a valid UUID: {}", e))?;

        let orchestrator_url = std::env::var("ORCHESTRATOR_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let deploy_command =
            std::env::var("DEPLOY_COMMAND").unwrap_or_else(|_| "./deploy.sh".to_string());

        let url_prefix =
            std::env::var("SERVICE_URL_PREFIX").unwrap_or_else(|_| "agent".to_string());

        let project_number =
            std::env::var("PROJECT_NUMBER").unwrap_or_else(|_| "000000000000".to_string());

        let region = std::env::var("REGION").unwrap_or_else(|_| "us-central1".to_string());

        let config = Self {
            deployment_id,
            orchestrator_url,
            deploy_command,
            url_prefix,
            project_number,
            region,
        };
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.orchestrator_url.is_empty() {
            anyhow::bail!("orchestrator_url cannot be empty");
        }

        if !self.orchestrator_url.starts_with("http://")
            && !self.orchestrator_url.starts_with("https://")
        {
            anyhow::bail!("orchestrator_url must start with http:// or https://");
        }

        if self.deploy_command.is_empty() {
            anyhow::bail!("deploy_command cannot be empty");
        }

        if self.region.is_empty() {
            anyhow::bail!("region cannot be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            deployment_id: Uuid::new_v4(),
            orchestrator_url: "http://localhost:8080".to_string(),
            deploy_command: "./deploy.sh".to_string(),
            url_prefix: "agent".to_string(),
            project_number: "123456789".to_string(),
            region: "us-central1".to_string(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = test_config();

        config.orchestrator_url = "not-a-url".to_string();
        assert!(config.validate().is_err());

        config.orchestrator_url = "http://localhost:8080".to_string();
        assert!(config.validate().is_ok());

        config.deploy_command = String::new();
        assert!(config.validate().is_err());
    }
}
