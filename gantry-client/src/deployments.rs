//! Deployment-related API endpoints

use std::time::{Duration, Instant};

use crate::OrchestratorClient;
use crate::error::{ClientError, Result};
use gantry_core::domain::deployment::{Deployment, DeploymentStatus};
use gantry_core::dto::deployment::{CompleteDeployment, CreateDeployment, ProgressUpdate};
use uuid::Uuid;

impl OrchestratorClient {
    // =============================================================================
    // Deployment Lifecycle
    // =============================================================================

    /// Create a new deployment record for a target
    ///
    /// The record starts pending; the change feed drives it from there.
    pub async fn create_deployment(&self, target_id: &str) -> Result<Deployment> {
        let url = format!("{}/deployment/create", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&CreateDeployment {
                target_id: target_id.to_string(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a deployment by ID
    pub async fn get_deployment(&self, deployment_id: Uuid) -> Result<Deployment> {
        let url = format!("{}/deployment/{}", self.base_url, deployment_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List all deployments
    pub async fn list_deployments(&self) -> Result<Vec<Deployment>> {
        let url = format!("{}/deployment/list", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Status Writes (Executor-specific)
    // =============================================================================

    /// Report progress on a non-terminal deployment
    pub async fn report_progress(
        &self,
        deployment_id: Uuid,
        progress_percentage: i32,
        current_step: &str,
    ) -> Result<()> {
        let url = format!("{}/deployment/{}/progress", self.base_url, deployment_id);
        let response = self
            .client
            .post(&url)
            .json(&ProgressUpdate {
                progress_percentage,
                current_step: current_step.to_string(),
            })
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    /// Mark a deployment as deployed with its resulting endpoint
    pub async fn complete_deployed(&self, deployment_id: Uuid, service_url: &str) -> Result<()> {
        self.complete(
            deployment_id,
            CompleteDeployment {
                status: DeploymentStatus::Deployed,
                service_url: Some(service_url.to_string()),
                error_message: None,
            },
        )
        .await
    }

    /// Mark a deployment as failed with a human-readable error
    pub async fn complete_failed(&self, deployment_id: Uuid, error_message: &str) -> Result<()> {
        self.complete(
            deployment_id,
            CompleteDeployment {
                status: DeploymentStatus::Failed,
                service_url: None,
                error_message: Some(error_message.to_string()),
            },
        )
        .await
    }

    async fn complete(&self, deployment_id: Uuid, req: CompleteDeployment) -> Result<()> {
        let url = format!("{}/deployment/{}/complete", self.base_url, deployment_id);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Status Poller
    // =============================================================================

    /// Poll a deployment until it reaches a terminal state
    ///
    /// Only `status` is authoritative; progress is read for display but never
    /// used to infer completion. Returns the final record, or
    /// [`ClientError::PollTimeout`] if `max_wait` elapses first.
    pub async fn wait_for_completion(
        &self,
        deployment_id: Uuid,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Result<Deployment> {
        let deadline = Instant::now() + max_wait;

        loop {
            let deployment = self.get_deployment(deployment_id).await?;

            if deployment.is_terminal() {
                return Ok(deployment);
            }

            tracing::debug!(
                "Deployment {} at {}% ({}); polling again",
                deployment_id,
                deployment.progress_percentage,
                deployment.current_step
            );

            if Instant::now() >= deadline {
                return Err(ClientError::PollTimeout(deployment_id));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }
}
