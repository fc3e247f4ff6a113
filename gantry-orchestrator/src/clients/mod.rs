//! External dispatch clients
//!
//! The orchestrator hands work off to two external services: the job
//! execution service (isolated single-shot executor runs for agent targets)
//! and the build pipeline service (parameterized build-and-deploy for
//! tool-server targets). Both are behind traits so the dispatch service can
//! be exercised without the network.
//!
//! Both calls are synchronous with bounded timeouts; a timeout is a
//! submission failure, never an unknown state.

pub mod builds;
pub mod job_runs;

pub use builds::{BuildService, HttpBuildService};
pub use job_runs::{HttpJobRunService, JobRunService};

use thiserror::Error;

/// Errors from dispatch calls to external services
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Transport failure, including request timeouts
    #[error("request to {service} failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Service answered with a non-success status
    #[error("{service} rejected submission (status {status}): {message}")]
    Rejected {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Response body could not be interpreted
    #[error("could not parse {service} response: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },
}
