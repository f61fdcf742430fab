mod memory_repository;
mod postgres_repository;

pub use memory_repository::create_memory_repository;
pub use postgres_repository::create_postgres_repository;

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Connects to PostgreSQL, retrying until `retry_count` attempts are spent,
/// then applies the embedded migrations.
pub async fn init_database_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    // ---
    let mut attempt = 0;
    let pool = loop {
        attempt += 1;
        let result = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await;

        match result {
            Ok(pool) => break pool,
            Err(e) if attempt < config.retry_count => {
                tracing::warn!(attempt, error = %e, "database not ready, retrying");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => {
                return Err(e).context(format!("connect to database after {attempt} attempts"));
            }
        }
    };

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("run database migrations")?;

    tracing::info!("database ready");
    Ok(pool)
}
