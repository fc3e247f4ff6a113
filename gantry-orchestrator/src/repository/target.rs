//! Target Repository
//!
//! Handles all database operations related to target records.

use gantry_core::domain::target::{Target, TargetKind};
use gantry_core::dto::target::CreateTarget;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new target record
pub async fn create(pool: &PgPool, req: CreateTarget) -> Result<Target, sqlx::Error> {
    let now = chrono::Utc::now();

    let target = Target {
        id: req.id.clone(),
        name: req.name.clone(),
        kind: req.kind,
        system_prompt: req.system_prompt.clone(),
        model: req.model.clone(),
        integrations: req.integrations.clone(),
        public_url: req.public_url.clone(),
        service_url: None,
        last_deployment_id: None,
        deployment_status: None,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO targets
            (id, name, kind, system_prompt, model, integrations, public_url,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(&req.id)
    .bind(&req.name)
    .bind(kind_to_string(req.kind))
    .bind(&req.system_prompt)
    .bind(&req.model)
    .bind(&req.integrations)
    .bind(&req.public_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(target)
}

/// Find a target by ID
pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Target>, sqlx::Error> {
    let row = sqlx::query_as::<_, TargetRow>(
        r#"
        SELECT id, name, kind, system_prompt, model, integrations, public_url,
               service_url, last_deployment_id, deployment_status,
               created_at, updated_at
        FROM targets
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Publish the live endpoint on the target record after a successful
/// deployment, with a back-reference to the deployment that produced it
pub async fn set_endpoint(
    pool: &PgPool,
    id: &str,
    service_url: &str,
    deployment_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE targets
        SET service_url = $1, last_deployment_id = $2,
            deployment_status = 'deployed', updated_at = $3
        WHERE id = $4
        "#,
    )
    .bind(service_url)
    .bind(deployment_id)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Helper Functions
// =============================================================================

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
struct TargetRow {
    id: String,
    name: String,
    kind: String,
    system_prompt: Option<String>,
    model: Option<String>,
    integrations: serde_json::Value,
    public_url: Option<String>,
    service_url: Option<String>,
    last_deployment_id: Option<Uuid>,
    deployment_status: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<TargetRow> for Target {
    fn from(row: TargetRow) -> Self {
        Target {
            id: row.id,
            name: row.name,
            kind: string_to_kind(&row.kind),
            system_prompt: row.system_prompt,
            model: row.model,
            integrations: row.integrations,
            public_url: row.public_url,
            service_url: row.service_url,
            last_deployment_id: row.last_deployment_id,
            deployment_status: row.deployment_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
