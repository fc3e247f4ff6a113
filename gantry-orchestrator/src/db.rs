use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create targets table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS targets (
            id VARCHAR(255) PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            kind VARCHAR(50) NOT NULL,
            system_prompt TEXT,
            model VARCHAR(255),
            integrations JSONB NOT NULL DEFAULT '{}',
            public_url TEXT,
            service_url TEXT,
            last_deployment_id UUID,
            deployment_status VARCHAR(50),
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create deployments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS deployments (
            id UUID PRIMARY KEY,
            target_id VARCHAR(255) NOT NULL REFERENCES targets(id),
            target_kind VARCHAR(50) NOT NULL,
            status VARCHAR(50) NOT NULL,
            progress_percentage INTEGER NOT NULL DEFAULT 0,
            current_step TEXT NOT NULL DEFAULT '',
            error_message TEXT,
            job_execution_ref VARCHAR(255),
            build_id VARCHAR(255),
            service_url TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            completed_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for better query performance
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_deployments_status ON deployments(status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_deployments_target_id ON deployments(target_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_deployments_created_at ON deployments(created_at DESC)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
