use std::collections::HashMap;

use anyhow::Result;
use dbsync_config::Config;
use dbsync_db::DbPool;
use dbsync_diff::{diff, IgnoreLists, TableAlterData};
use dbsync_notify::{RunReport, TableReport};

/// Runs the schema half of a sync: diffs every selected table and applies
/// the resulting plan, isolated groups first (spec.md §4.4-§4.5).
pub async fn sync_schema(config: &Config, source: &DbPool, dest: &DbPool) -> Result<RunReport> {
    let (alters, before_schemas) = collect_alters(config, source, dest).await?;
    let plan = dbsync_diff::plan(alters);

    let mut report = RunReport::new();

    if !config.sync {
        // Diffs are computed and reported but never applied (spec.md §3, "sync").
        for group in plan.groups_in_order() {
            for alter in &group.alters {
                report.record_table(TableReport {
                    table: alter.table.clone(),
                    before_schema: before_schemas.get(&alter.table).cloned().unwrap_or_default(),
                    after_schema: None,
                    statement: alter.statement.clone(),
                    elapsed_ms: 0,
                    error: None,
                });
            }
        }
        return Ok(report);
    }

    for group in plan.groups_in_order() {
        match dbsync_apply::apply_group(dest, group).await {
            Ok(outcome) => {
                for alter in &group.alters {
                    // Diagnostic re-read of the destination's new canonical
                    // creation, matching spec.md §4.5's "on success queries
                    // the resulting columns for diagnostic logging" and
                    // §7's per-table "after schema" record.
                    let after_schema = dbsync_db::fetch_schema(dest, &alter.table).await.ok();
                    report.record_table(TableReport {
                        table: alter.table.clone(),
                        before_schema: before_schemas.get(&alter.table).cloned().unwrap_or_default(),
                        after_schema,
                        statement: alter.statement.clone(),
                        elapsed_ms: outcome.elapsed.as_millis() as u64,
                        error: None,
                    });
                }
            }
            Err(err) => {
                for alter in &group.alters {
                    report.record_table(TableReport {
                        table: alter.table.clone(),
                        before_schema: before_schemas.get(&alter.table).cloned().unwrap_or_default(),
                        after_schema: None,
                        statement: alter.statement.clone(),
                        elapsed_ms: 0,
                        error: Some(err.to_string()),
                    });
                }
                tracing::error!(key = %group.key, error = %err, "group failed, continuing with remaining groups");
            }
        }
    }

    Ok(report)
}

/// Copies row data for every table named in `config.sync_data_tables`
/// (spec.md §4.6), recording per-table row counts into `report`.
pub async fn sync_data(config: &Config, source: &DbPool, dest: &DbPool, report: &mut RunReport) -> Result<u64> {
    let mut total = 0u64;
    for table in &config.sync_data_tables {
        // A truncate failure aborts only this table's row copy (spec.md §7);
        // the remaining configured tables still get attempted.
        match dbsync_rowcopy::copy_table(source, dest, table, config.sync_data_truncate).await {
            Ok(outcome) => total += outcome.rows_copied,
            Err(err) => tracing::error!(table, error = %err, "row copy failed for table, continuing"),
        }
    }
    report.rows_copied = total;
    Ok(total)
}

async fn collect_alters(
    config: &Config,
    source: &DbPool,
    dest: &DbPool,
) -> Result<(Vec<TableAlterData>, HashMap<String, String>)> {
    let source_tables = dbsync_db::list_tables(source).await?;
    let dest_tables = dbsync_db::list_tables(dest).await?;

    let mut names: Vec<String> = source_tables.into_iter().chain(dest_tables).collect();
    names.sort();
    names.dedup();

    let mut alters = Vec::new();
    let mut before_schemas = HashMap::new();
    for table in names {
        if !config.table_is_selected(&table) {
            continue;
        }

        let source_ddl = dbsync_db::fetch_schema(source, &table).await?;
        let dest_ddl = dbsync_db::fetch_schema(dest, &table).await?;
        let overrides = config.overrides_for(&table);
        let ignore = IgnoreLists {
            columns: &overrides.ignore_columns,
            indexes: &overrides.ignore_indexes,
            foreign_keys: &overrides.ignore_foreign_keys,
        };

        before_schemas.insert(table.clone(), dest_ddl.clone());
        alters.push(diff(&table, &source_ddl, &dest_ddl, config.drop, ignore));
    }

    Ok((alters, before_schemas))
}
