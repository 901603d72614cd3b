//! Database bootstrap for the portal
//!
//! Connects through `common`, verifies connectivity and applies the
//! embedded migrations that create the `users` table.

use anyhow::Result;
use common::{
    database::{DatabaseConfig, health_check, init_pool},
    error::{DatabaseError, DatabaseResult},
};
use sqlx::PgPool;
use tracing::info;

/// Connect, check and migrate the user database
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = init_pool(config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Apply pending migrations
pub async fn run_migrations(pool: &PgPool) -> DatabaseResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    info!("Database migrations applied");
    Ok(())
}
