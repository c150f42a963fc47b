use anyhow::{Context, Result};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

/// Connection handle shared by the schema reader, applier and row copier.
pub type DbPool = MySqlPool;

/// Opens a pooled connection to a MySQL-dialect database.
///
/// Connection failure is fatal for the run (spec.md §7): callers should
/// propagate the error rather than retry or fall back.
pub async fn connect(database_url: &str) -> Result<DbPool> {
    MySqlPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .with_context(|| "failed to connect to database".to_string())
}
