use sqlx::{migrate::Migrator, sqlite::SqlitePoolOptions, SqlitePool};

use crate::{config::Config, error::Result};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens the connection pool and brings the schema up to date.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    MIGRATOR.run(&pool).await?;
    tracing::debug!(url = %config.database_url, "database migrated");

    Ok(pool)
}
