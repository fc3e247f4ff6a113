//! Build pipeline service client
//!
//! Submits a parameterized build-and-deploy job for tool-server targets.
//! Completion is reported out-of-band (build webhook or poll), never through
//! this call; only the submission itself is synchronous.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use crate::clients::SubmissionError;

const SERVICE_NAME: &str = "build pipeline service";

const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Submits builds to the external build pipeline service
#[async_trait]
pub trait BuildService: Send + Sync {
    /// Submit a build for a tool-server target
    ///
    /// Returns the opaque build ID assigned by the pipeline.
    async fn submit_build(
        &self,
        deployment_id: Uuid,
        target_id: &str,
        config_url: &str,
    ) -> Result<String, SubmissionError>;
}

/// HTTP implementation against the build pipeline API
pub struct HttpBuildService {
    base_url: String,
    config_path: String,
    client: reqwest::Client,
}

impl HttpBuildService {
    /// Errors if the bounded-timeout HTTP client cannot be built; a client
    /// without the dispatch timeout must never be used as a fallback.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let base_url = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            config_path: std::env::var("BUILD_CONFIG_PATH")
                .unwrap_or_else(|_| "pipelines/tool-server.yaml".to_string()),
            client: reqwest::Client::builder()
                .timeout(DISPATCH_TIMEOUT)
                .build()?,
        })
    }
}

#[derive(Debug, Serialize)]
struct SubmitBuildRequest<'a> {
    config_path: &'a str,
    substitutions: HashMap<&'static str, String>,
}

#[derive(Debug, Deserialize)]
struct SubmitBuildResponse {
    build_id: String,
}

#[async_trait]
impl BuildService for HttpBuildService {
    async fn submit_build(
        &self,
        deployment_id: Uuid,
        target_id: &str,
        config_url: &str,
    ) -> Result<String, SubmissionError> {
        let url = format!("{}/builds", self.base_url);

        tracing::info!(
            "Submitting build for deployment {} (target {})",
            deployment_id,
            target_id
        );

        let mut substitutions = HashMap::new();
        substitutions.insert("DEPLOYMENT_ID", deployment_id.to_string());
        substitutions.insert("TARGET_ID", target_id.to_string());
        substitutions.insert("CONFIG_URL", config_url.to_string());

        let response = self
            .client
            .post(&url)
            .json(&SubmitBuildRequest {
                config_path: &self.config_path,
                substitutions,
            })
            .send()
            .await
            .map_err(|source| SubmissionError::Request {
                service: SERVICE_NAME,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SubmissionError::Rejected {
                service: SERVICE_NAME,
                status: status.as_u16(),
                message,
            });
        }

        let body: SubmitBuildResponse =
            response
                .json()
                .await
                .map_err(|e| SubmissionError::Parse {
                    service: SERVICE_NAME,
                    message: e.to_string(),
                })?;

        Ok(body.build_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_bounded_client() {
        let service = HttpBuildService::new("http://localhost:9091/").unwrap();
        assert_eq!(service.base_url, "http://localhost:9091");
    }
}
