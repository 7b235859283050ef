use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::Result;

///Opens a connection pool, creating the database file if needed, and applies migrations.
pub async fn setup_database(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    //each in-memory connection is its own database, so keep exactly one alive
    let in_memory = database_url.contains(":memory:");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections)
    };

    let pool = pool_options
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, url = %database_url, "failed to connect to database"))?;
    tracing::info!(url = %database_url, "connected to database");

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "schema migration failed"))?;
    tracing::info!("schema applied");
    Ok(())
}
