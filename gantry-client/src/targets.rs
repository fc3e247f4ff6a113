//! Target-related API endpoints

use crate::OrchestratorClient;
use crate::error::Result;
use gantry_core::domain::target::Target;
use gantry_core::dto::target::{CreateTarget, SetEndpoint};
use uuid::Uuid;

impl OrchestratorClient {
    /// Create a new target record
    pub async fn create_target(&self, req: CreateTarget) -> Result<Target> {
        let url = format!("{}/target/create", self.base_url);
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Get a target by ID
    pub async fn get_target(&self, target_id: &str) -> Result<Target> {
        let url = format!("{}/target/{}", self.base_url, target_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Publish the live endpoint on a target after a successful deployment
    ///
    /// Future reads of the target reflect the live endpoint without
    /// consulting deployment history.
    pub async fn set_target_endpoint(
        &self,
        target_id: &str,
        service_url: &str,
        deployment_id: Uuid,
    ) -> Result<()> {
        let url = format!("{}/target/{}/endpoint", self.base_url, target_id);
        let response = self
            .client
            .post(&url)
            .json(&SetEndpoint {
                service_url: service_url.to_string(),
                deployment_id,
            })
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
