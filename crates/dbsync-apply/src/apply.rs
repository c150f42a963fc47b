use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use dbsync_db::DbPool;
use dbsync_diff::{compose_group_statement, Group};

/// Outcome of applying one group's composed statement (spec.md §4.5).
#[derive(Debug)]
pub struct ApplyOutcome {
    pub key: String,
    pub rows_affected: u64,
    pub elapsed: Duration,
}

/// Applies a single group: the composite statement first, falling back to an
/// explicit transaction over the group's individual statements when the
/// composite fails and there is more than one statement to fall back to
/// (spec.md §4.5). Logs start, end and elapsed time via `tracing`.
pub async fn apply_group(pool: &DbPool, group: &Group) -> Result<ApplyOutcome> {
    let composite = compose_group_statement(group);
    let start = Instant::now();

    tracing::info!(key = %group.key, tables = group.alters.len(), "apply start");

    let outcome = match sqlx::query(&composite).execute(pool).await {
        Ok(result) => Ok(result.rows_affected()),
        Err(composite_err) if group.alters.len() > 1 => {
            tracing::warn!(
                key = %group.key,
                error = %composite_err,
                "composite statement failed, falling back to per-statement transaction"
            );
            apply_individually(pool, group).await
        }
        Err(composite_err) => {
            Err(composite_err).with_context(|| format!("applying group `{}`", group.key))
        }
    };

    let elapsed = start.elapsed();
    match &outcome {
        Ok(rows_affected) => {
            tracing::info!(
                key = %group.key,
                rows_affected,
                elapsed_ms = elapsed.as_millis() as u64,
                "apply success"
            );
        }
        Err(err) => {
            tracing::error!(
                key = %group.key,
                error = %err,
                elapsed_ms = elapsed.as_millis() as u64,
                "apply failed"
            );
        }
    }

    outcome.map(|rows_affected| ApplyOutcome {
        key: group.key.clone(),
        rows_affected,
        elapsed,
    })
}

/// Runs each alter's own statement inside one transaction, rolling back on
/// the first failure (spec.md §4.5: "the first failing statement rolls back
/// the whole group; no partial group is left applied").
async fn apply_individually(pool: &DbPool, group: &Group) -> Result<u64> {
    let mut tx = pool
        .begin()
        .await
        .with_context(|| format!("starting fallback transaction for group `{}`", group.key))?;

    let mut rows_affected = 0u64;
    for alter in &group.alters {
        let stmt = alter.statement.trim();
        match sqlx::query(stmt).execute(&mut *tx).await {
            Ok(result) => rows_affected += result.rows_affected(),
            Err(err) => {
                tx.rollback().await.ok();
                return Err(err)
                    .with_context(|| format!("applying `{}` in group `{}`", alter.table, group.key));
            }
        }
    }

    tx.commit()
        .await
        .with_context(|| format!("committing fallback transaction for group `{}`", group.key))?;

    Ok(rows_affected)
}

/// Applies every group in a plan, isolated groups first. A group's failure
/// is reported in its slot but does not stop the remaining groups from being
/// attempted (spec.md §4.5: "a group's failure is reported and counted but
/// does not halt subsequent groups").
pub async fn apply_plan(pool: &DbPool, plan: &dbsync_diff::Plan) -> Vec<Result<ApplyOutcome>> {
    let mut outcomes = Vec::new();
    for group in plan.groups_in_order() {
        outcomes.push(apply_group(pool, group).await);
    }
    outcomes
}
