//! Job execution service client
//!
//! Starts an isolated, single-shot run of the deployment executor, passing
//! the deployment ID as the run's sole parameter. Fire-and-forget: the run's
//! completion is observed through the status record, never through this call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::clients::SubmissionError;

const SERVICE_NAME: &str = "job execution service";

/// Default bound on the synchronous dispatch call
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Starts executor runs on the external job execution service
#[async_trait]
pub trait JobRunService: Send + Sync {
    /// Start a new run of the deployment executor for `deployment_id`
    ///
    /// Returns an opaque execution reference for cross-referencing.
    async fn start_run(&self, deployment_id: Uuid) -> Result<String, SubmissionError>;
}

/// HTTP implementation against the job execution service API
pub struct HttpJobRunService {
    base_url: String,
    job_name: String,
    client: reqwest::Client,
}

impl HttpJobRunService {
    /// Errors if the bounded-timeout HTTP client cannot be built; a client
    /// without the dispatch timeout must never be used as a fallback.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let base_url = base_url.into();
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            job_name: std::env::var("EXECUTOR_JOB_NAME")
                .unwrap_or_else(|_| "gantry-executor".to_string()),
            client: reqwest::Client::builder()
                .timeout(DISPATCH_TIMEOUT)
                .build()?,
        })
    }
}

#[derive(Debug, Serialize)]
struct StartRunRequest<'a> {
    job_name: &'a str,
    env: StartRunEnv,
}

#[derive(Debug, Serialize)]
struct StartRunEnv {
    #[serde(rename = "DEPLOYMENT_ID")]
    deployment_id: String,
}

#[derive(Debug, Deserialize)]
struct StartRunResponse {
    execution_ref: String,
}

#[async_trait]
impl JobRunService for HttpJobRunService {
    async fn start_run(&self, deployment_id: Uuid) -> Result<String, SubmissionError> {
        let url = format!("{}/runs", self.base_url);

        tracing::info!("Starting executor run for deployment {}", deployment_id);

        let response = self
            .client
            .post(&url)
            .json(&StartRunRequest {
                job_name: &self.job_name,
                env: StartRunEnv {
                    deployment_id: deployment_id.to_string(),
                },
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

        let body: StartRunResponse =
            response
                .json()
                .await
                .map_err(|e| SubmissionError::Parse {
                    service: SERVICE_NAME,
                    message: e.to_string(),
                })?;

        Ok(body.execution_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_bounded_client() {
        let service = HttpJobRunService::new("http://localhost:9090/").unwrap();
        assert_eq!(service.base_url, "http://localhost:9090");
    }
}
