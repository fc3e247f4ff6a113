//! Deployment Repository
//!
//! Handles all database operations related to deployment records.
//!
//! Mutating statements carry a `status NOT IN ('deployed', 'failed')` guard
//! and report whether the row was applied. Concurrent executors therefore
//! cannot resurrect a terminal record or move progress backwards, even under
//! last-writer-wins on the remaining columns.

use gantry_core::domain::deployment::{Deployment, DeploymentStatus};
use gantry_core::domain::target::TargetKind;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new deployment record in pending state
pub async fn create(
    pool: &PgPool,
    target_id: &str,
    target_kind: TargetKind,
) -> Result<Deployment, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    let deployment = Deployment {
        id,
        target_id: target_id.to_string(),
        target_kind,
        status: DeploymentStatus::Pending,
        progress_percentage: 0,
        current_step: "queued".to_string(),
        error_message: None,
        job_execution_ref: None,
        build_id: None,
        service_url: None,
        created_at: now,
        updated_at: now,
        completed_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO deployments
            (id, target_id, target_kind, status, progress_percentage, current_step,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(target_id)
    .bind(kind_to_string(target_kind))
    .bind(status_to_string(DeploymentStatus::Pending))
    .bind(0_i32)
    .bind("queued")
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(deployment)
}

/// Find a deployment by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Deployment>, sqlx::Error> {
    let row = sqlx::query_as::<_, DeploymentRow>(
        r#"
        SELECT id, target_id, target_kind, status, progress_percentage, current_step,
               error_message, job_execution_ref, build_id, service_url,
               created_at, updated_at, completed_at
        FROM deployments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all deployments, newest first
pub async fn list_all(pool: &PgPool) -> Result<Vec<Deployment>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DeploymentRow>(
        r#"
        SELECT id, target_id, target_kind, status, progress_percentage, current_step,
               error_message, job_execution_ref, build_id, service_url,
               created_at, updated_at, completed_at
        FROM deployments
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

// Mutating statements, kept as consts so the guard clauses are asserted in
// the tests below. Each one re-checks the record's state under the write.

const MARK_JOB_DISPATCHED_SQL: &str = r#"
    UPDATE deployments
    SET status = 'processing',
        progress_percentage = GREATEST(progress_percentage, 5),
        current_step = CASE WHEN status = 'pending'
                            THEN 'dispatched to job execution service'
                            ELSE current_step END,
        job_execution_ref = $1, updated_at = $2
    WHERE id = $3 AND status NOT IN ('deployed', 'failed')
      AND job_execution_ref IS NULL
"#;

const MARK_BUILD_SUBMITTED_SQL: &str = r#"
    UPDATE deployments
    SET status = 'processing',
        progress_percentage = GREATEST(progress_percentage, 5),
        current_step = CASE WHEN status = 'pending'
                            THEN 'build ' || $1 || ' submitted to build pipeline'
                            ELSE current_step END,
        build_id = $1, updated_at = $2
    WHERE id = $3 AND status NOT IN ('deployed', 'failed')
      AND build_id IS NULL
"#;

const UPDATE_PROGRESS_SQL: &str = r#"
    UPDATE deployments
    SET status = 'processing',
        progress_percentage = GREATEST(progress_percentage, $1),
        current_step = $2, updated_at = $3
    WHERE id = $4 AND status NOT IN ('deployed', 'failed')
"#;

const MARK_DEPLOYED_SQL: &str = r#"
    UPDATE deployments
    SET status = 'deployed', progress_percentage = 100,
        current_step = 'deployed', service_url = $1,
        updated_at = $2, completed_at = $2
    WHERE id = $3 AND status NOT IN ('deployed', 'failed')
"#;

const MARK_FAILED_SQL: &str = r#"
    UPDATE deployments
    SET status = 'failed', current_step = 'failed', error_message = $1,
        updated_at = $2, completed_at = $2
    WHERE id = $3 AND status NOT IN ('deployed', 'failed')
"#;

/// Record the job execution reference after dispatch
///
/// Applies while the record is non-terminal and no reference has been set
/// yet, so a redelivered event never overwrites the first dispatch and a
/// fast executor run (which can move the record to processing before this
/// write lands) does not drop the cross-reference. The step text is only
/// rewritten if the executor has not reported its own yet.
pub async fn mark_job_dispatched(
    pool: &PgPool,
    id: Uuid,
    job_execution_ref: &str,
) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now();

    let result = sqlx::query(MARK_JOB_DISPATCHED_SQL)
        .bind(job_execution_ref)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Record the build ID after submission to the build pipeline
pub async fn mark_build_submitted(
    pool: &PgPool,
    id: Uuid,
    build_id: &str,
) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now();

    let result = sqlx::query(MARK_BUILD_SUBMITTED_SQL)
        .bind(build_id)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Update progress and current step on a non-terminal record
///
/// GREATEST keeps progress monotone even if updates arrive out of order.
pub async fn update_progress(
    pool: &PgPool,
    id: Uuid,
    progress_percentage: i32,
    current_step: &str,
) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now();

    let result = sqlx::query(UPDATE_PROGRESS_SQL)
        .bind(progress_percentage)
        .bind(current_step)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Terminal transition to deployed with the resulting endpoint
pub async fn mark_deployed(
    pool: &PgPool,
    id: Uuid,
    service_url: &str,
) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now();

    let result = sqlx::query(MARK_DEPLOYED_SQL)
        .bind(service_url)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Terminal transition to failed with a human-readable error
pub async fn mark_failed(
    pool: &PgPool,
    id: Uuid,
    error_message: &str,
) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now();

    let result = sqlx::query(MARK_FAILED_SQL)
        .bind(error_message)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Helper Functions
// =============================================================================

fn status_to_string(status: DeploymentStatus) -> &'static str {
    match status {
        DeploymentStatus::Pending => "pending",
        DeploymentStatus::Processing => "processing",
        DeploymentStatus::Deployed => "deployed",
        DeploymentStatus::Failed => "failed",
    }
}

fn string_to_status(s: &str) -> DeploymentStatus {
    match s {
        "pending" => DeploymentStatus::Pending,
        "processing" => DeploymentStatus::Processing,
        "deployed" => DeploymentStatus::Deployed,
        "failed" => DeploymentStatus::Failed,
        _ => DeploymentStatus::Pending,
    }
}

fn kind_to_string(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Agent => "agent",
        TargetKind::ToolServer => "tool-server",
    }
}

fn string_to_kind(s: &str) -> TargetKind {
    match s {
        "tool-server" => TargetKind::ToolServer,
        _ => TargetKind::Agent,
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct DeploymentRow {
    id: Uuid,
    target_id: String,
    target_kind: String,
    status: String,
    progress_percentage: i32,
    current_step: String,
    error_message: Option<String>,
    job_execution_ref: Option<String>,
    build_id: Option<String>,
    service_url: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<DeploymentRow> for Deployment {
    fn from(row: DeploymentRow) -> Self {
        Deployment {
            id: row.id,
            target_id: row.target_id,
            target_kind: string_to_kind(&row.target_kind),
            status: string_to_status(&row.status),
            progress_percentage: row.progress_percentage,
            current_step: row.current_step,
            error_message: row.error_message,
            job_execution_ref: row.job_execution_ref,
            build_id: row.build_id,
            service_url: row.service_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            DeploymentStatus::Pending,
            DeploymentStatus::Processing,
            DeploymentStatus::Deployed,
            DeploymentStatus::Failed,
        ] {
            assert_eq!(string_to_status(status_to_string(status)), status);
        }
    }

    #[test]
    fn test_unknown_status_defaults_to_pending() {
        assert_eq!(string_to_status("garbage"), DeploymentStatus::Pending);
    }

    #[test]
    fn test_mutations_refuse_terminal_records() {
        for sql in [
            MARK_JOB_DISPATCHED_SQL,
            MARK_BUILD_SUBMITTED_SQL,
            UPDATE_PROGRESS_SQL,
            MARK_DEPLOYED_SQL,
            MARK_FAILED_SQL,
        ] {
            assert!(
                sql.contains("status NOT IN ('deployed', 'failed')"),
                "missing terminal guard in: {}",
                sql
            );
        }
    }

    #[test]
    fn test_progress_writes_are_monotone() {
        for sql in [
            MARK_JOB_DISPATCHED_SQL,
            MARK_BUILD_SUBMITTED_SQL,
            UPDATE_PROGRESS_SQL,
        ] {
            assert!(
                sql.contains("GREATEST(progress_percentage"),
                "missing monotone progress clause in: {}",
                sql
            );
        }
    }

    #[test]
    fn test_dispatch_marks_keep_first_reference() {
        assert!(MARK_JOB_DISPATCHED_SQL.contains("job_execution_ref IS NULL"));
        assert!(MARK_BUILD_SUBMITTED_SQL.contains("build_id IS NULL"));
    }

    #[test]
    fn test_kind_string_round_trip() {
        assert_eq!(string_to_kind(kind_to_string(TargetKind::Agent)), TargetKind::Agent);
        assert_eq!(
            string_to_kind(kind_to_string(TargetKind::ToolServer)),
            TargetKind::ToolServer
        );
    }
}
