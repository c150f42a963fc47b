use anyhow::{Context, Result};
use dbsync_db::{has_auto_increment, row_to_map, table_status, DbPool};

use crate::render::{build_insert_sql, PAGE_SIZE};

fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Outcome of copying one table's row data (spec.md §4.6).
#[derive(Debug)]
pub struct CopyOutcome {
    pub table: String,
    pub rows_copied: u64,
}

/// Copies every row of `table` from `source` to `dest`, paginating with a
/// fixed page size of 100 (spec.md §4.6). When `truncate` is set, the
/// destination table is truncated first; otherwise rows are appended and,
/// if the destination reports an auto-increment column, the `id` column of
/// each inserted row is rendered as `NULL` so the destination assigns its
/// own values instead of colliding with the source's.
pub async fn copy_table(source: &DbPool, dest: &DbPool, table: &str, truncate: bool) -> Result<CopyOutcome> {
    let quoted = quote_ident(table);

    if truncate {
        sqlx::query(&format!("TRUNCATE TABLE {quoted}"))
            .execute(dest)
            .await
            .with_context(|| format!("truncating `{table}` before row copy"))?;
    }

    let null_id = if truncate {
        false
    } else {
        table_status(dest, table)
            .await?
            .map(|status| has_auto_increment(&status))
            .unwrap_or(false)
    };

    let mut offset: u64 = 0;
    let mut rows_copied: u64 = 0;

    tracing::info!(table, truncate, "row copy start");

    loop {
        let page = sqlx::query(&format!("SELECT * FROM {quoted} LIMIT {offset}, {PAGE_SIZE}"))
            .fetch_all(source)
            .await
            .with_context(|| format!("reading page at offset {offset} for `{table}`"))?;

        if page.is_empty() {
            break;
        }

        let page_len = page.len() as u64;

        for row in &page {
            let values = match row_to_map(row) {
                Ok(values) => values,
                Err(err) => {
                    tracing::warn!(table, error = %err, "skipping row: failed to decode");
                    continue;
                }
            };
            let insert_sql = build_insert_sql(table, values, null_id);
            match sqlx::query(&insert_sql).execute(dest).await {
                Ok(result) if result.rows_affected() > 0 => rows_copied += 1,
                Ok(_) => tracing::warn!(table, "insert affected no rows"),
                Err(err) => tracing::warn!(table, error = %err, sql = %insert_sql, "skipping row: insert failed"),
            }
        }

        if page_len < PAGE_SIZE {
            break;
        }
        offset += PAGE_SIZE;
    }

    tracing::info!(table, rows_copied, "row copy complete");

    Ok(CopyOutcome {
        table: table.to_string(),
        rows_copied,
    })
}
