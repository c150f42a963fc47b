use anyhow::{Context, Result};
use sqlx::Row;

use crate::connect::DbPool;
use crate::value::{row_to_map, Value};

/// Quotes a MySQL identifier, doubling any embedded backtick.
///
/// Table and column names are trusted input (spec.md §9: they come from the
/// authoritative source schema), but doubling embedded backticks is cheap
/// and keeps a pathological name from producing invalid SQL.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Lists all base table names visible to the current connection, in a
/// stable (alphabetical) order.
pub async fn list_tables(pool: &DbPool) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' \
         ORDER BY table_name",
    )
    .fetch_all(pool)
    .await
    .context("failed to list tables")?;

    rows.into_iter()
        .map(|row| row.try_get::<String, _>(0).context("reading table_name"))
        .collect()
}

/// Returns the canonical `SHOW CREATE TABLE` statement for `table`, or an
/// empty string if the table does not exist (spec.md §4.1: missing table is
/// not an error).
pub async fn fetch_schema(pool: &DbPool, table: &str) -> Result<String> {
    let sql = format!("SHOW CREATE TABLE {}", quote_ident(table));

    match sqlx::query(&sql).fetch_one(pool).await {
        Ok(row) => {
            let create: String = row.try_get(1).context("reading Create Table column")?;
            Ok(create)
        }
        Err(sqlx::Error::Database(db_err)) if is_no_such_table(db_err.as_ref()) => {
            Ok(String::new())
        }
        Err(e) => Err(e).with_context(|| format!("failed to fetch schema for `{table}`")),
    }
}

fn is_no_such_table(db_err: &dyn sqlx::error::DatabaseError) -> bool {
    db_err.code().as_deref() == Some("42S02")
}

/// Returns the engine's `SHOW TABLE STATUS` row for `table` as a column-name
/// keyed map, or `None` if the table does not exist.
pub async fn table_status(pool: &DbPool, table: &str) -> Result<Option<Vec<(String, Value)>>> {
    let row = sqlx::query("SHOW TABLE STATUS WHERE Name = ?")
        .bind(table)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("failed to read table status for `{table}`"))?;

    match row {
        Some(row) => Ok(Some(row_to_map(&row)?)),
        None => Ok(None),
    }
}

/// Returns whether `status` indicates the table has an auto-increment
/// column, per spec.md §4.6: presence of a non-null `Auto_increment` value.
pub fn has_auto_increment(status: &[(String, Value)]) -> bool {
    status
        .iter()
        .any(|(k, v)| k.eq_ignore_ascii_case("Auto_increment") && !v.is_null())
}
