use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub const MAX_CONNECTIONS: u32 = 20;
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Pool settings shared by the server and its tests.
pub fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

/// Connect to the Supabase Postgres instance.
///
/// # Errors
///
/// Returns an error if the URL is invalid or no connection is established
/// within [`ACQUIRE_TIMEOUT`].
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = pool_options()
        .connect(database_url)
        .await
        .context("failed to connect to database")?;
    tracing::info!(max_connections = MAX_CONNECTIONS, "database pool ready");
    Ok(pool)
}

/// Round-trip a trivial query; backs the readiness probe.
///
/// # Errors
///
/// Returns an error if no connection can be acquired or the query fails.
pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("database ping failed")?;
    Ok(())
}
