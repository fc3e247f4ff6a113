//! External deploy procedure invocation
//!
//! The actual provisioning is performed by an independently-versioned deploy
//! command run as a subprocess with `(deployment_id, target_id)` as
//! positional arguments. On success it prints a `SERVICE_URL=<url>` marker to
//! standard output; a non-zero exit is a failure regardless of output.
//!
//! The marker may legitimately be absent on a zero exit: the procedure is
//! allowed to omit it, and the resulting endpoint is then derived from the
//! documented URL template. That fallback is an intentional best-effort
//! policy, not a silent failure.

use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Marker line printed by the deploy command on success
const SERVICE_URL_MARKER: &str = "SERVICE_URL=";

/// How much combined output to keep in an error message
const OUTPUT_TAIL_CHARS: usize = 2000;

/// Run the external deploy command to completion and return its combined output
///
/// This is the single long-running blocking operation of the pipeline; it can
/// run for minutes and carries no internal timeout. The job execution
/// service's run-timeout is the backstop.
pub async fn run_deploy_command(
    command: &str,
    deployment_id: Uuid,
    target_id: &str,
) -> Result<String> {
    info!(
        "Running deploy command {} for deployment {} (target {})",
        command, deployment_id, target_id
    );

    let output = Command::new(command)
        .arg(deployment_id.to_string())
        .arg(target_id)
        .stdin(Stdio::null())
        .output()
        .await
        .with_context(|| format!("Failed to execute deploy command '{}'", command))?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        combined.push('\n');
        combined.push_str(&stderr);
    }

    debug!(
        "Deploy command exited with {:?}, {} bytes of output",
        output.status.code(),
        combined.len()
    );

    if !output.status.success() {
        anyhow::bail!(
            "deploy command exited with {}: {}",
            output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            output_tail(&combined)
        );
    }

    Ok(combined)
}

/// Extract the endpoint URL from the deploy command's output
///
/// Scans for the last `SERVICE_URL=` marker line so that procedures which
/// echo their own invocation don't confuse the parse.
pub fn parse_service_url(output: &str) -> Option<String> {
    output
        .lines()
        .rev()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(SERVICE_URL_MARKER))
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// Render the templated fallback endpoint for a target
///
/// `https://<prefix>-<target_id>-<project-number>.<region>.run.app`
pub fn fallback_service_url(
    prefix: &str,
    target_id: &str,
    project_number: &str,
    region: &str,
) -> String {
    format!(
        "https://{}-{}-{}.{}.run.app",
        prefix, target_id, project_number, region
    )
}

/// Resolve the endpoint from command output, falling back to the template
pub fn resolve_service_url(
    output: &str,
    prefix: &str,
    target_id: &str,
    project_number: &str,
    region: &str,
) -> String {
    match parse_service_url(output) {
        Some(url) => url,
        None => {
            let url = fallback_service_url(prefix, target_id, project_number, region);
            warn!(
                "Deploy command printed no {} marker; using templated URL {}",
                SERVICE_URL_MARKER, url
            );
            url
        }
    }
}

fn output_tail(output: &str) -> &str {
    let start = output
        .char_indices()
        .rev()
        .nth(OUTPUT_TAIL_CHARS.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    output[start..].trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marker_line() {
        let output = "pulling image...\nSERVICE_URL=https://agent-a.example.run.app\ndone\n";
        assert_eq!(
            parse_service_url(output),
            Some("https://agent-a.example.run.app".to_string())
        );
    }

    #[test]
    fn test_parse_takes_last_marker() {
        let output = "SERVICE_URL=https://first.run.app\nSERVICE_URL=https://second.run.app\n";
        assert_eq!(
            parse_service_url(output),
            Some("https://second.run.app".to_string())
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let output = "  SERVICE_URL=https://agent.run.app  \n";
        assert_eq!(
            parse_service_url(output),
            Some("https://agent.run.app".to_string())
        );
    }

    #[test]
    fn test_parse_missing_marker() {
        assert_eq!(parse_service_url("deploy finished\n"), None);
        assert_eq!(parse_service_url(""), None);
    }

    #[test]
    fn test_parse_empty_marker_value() {
        assert_eq!(parse_service_url("SERVICE_URL=\n"), None);
    }

    #[test]
    fn test_fallback_url_template() {
        let url = fallback_service_url("agent", "agentA", "123456789", "us-central1");
        assert_eq!(url, "https://agent-agentA-123456789.us-central1.run.app");
    }

    #[test]
    fn test_resolve_prefers_marker() {
        let output = "SERVICE_URL=https://real.run.app\n";
        let url = resolve_service_url(output, "agent", "agentA", "123", "us-central1");
        assert_eq!(url, "https://real.run.app");
    }

    #[test]
    fn test_resolve_falls_back_to_template() {
        let url = resolve_service_url("no marker here", "agent", "agentA", "123", "us-central1");
        assert_eq!(url, "https://agent-agentA-123.us-central1.run.app");
    }

    #[test]
    fn test_output_tail_bounds_long_output() {
        let long = "x".repeat(10_000);
        assert!(output_tail(&long).len() <= OUTPUT_TAIL_CHARS);
    }

    #[tokio::test]
    async fn test_run_deploy_command_captures_output() {
        let deployment_id = Uuid::new_v4();
        let output = run_deploy_command("echo", deployment_id, "agentA")
            .await
            .unwrap();

        assert!(output.contains(&deployment_id.to_string()));
        assert!(output.contains("agentA"));
    }

    #[tokio::test]
    async fn test_run_deploy_command_nonzero_exit_fails() {
        let err = run_deploy_command("false", Uuid::new_v4(), "agentA")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("exited"));
    }

    #[tokio::test]
    async fn test_run_deploy_command_missing_binary_fails() {
        let result =
            run_deploy_command("/nonexistent/deploy-command", Uuid::new_v4(), "agentA").await;

        assert!(result.is_err());
    }
}
