//! SQL Applier (spec.md §4.5): submits a group's composed alter statement to
//! the destination, falling back to a per-statement transaction on failure.

mod apply;

pub use apply::{apply_group, apply_plan, ApplyOutcome};

#[cfg(test)]
mod tests {
    use dbsync_diff::{diff, Group, IgnoreLists};

    #[test]
    fn compose_group_statement_is_what_apply_submits_first() {
        let source = "CREATE TABLE `t` (\n  `id` int NOT NULL,\n  `a` int DEFAULT NULL\n) ENGINE=InnoDB";
        let alter = diff("t", source, "", false, IgnoreLists::default());
        let group = Group {
            key: "single:t".to_string(),
            alters: vec![alter],
        };
        let composed = dbsync_diff::compose_group_statement(&group);
        assert!(composed.starts_with("CREATE TABLE"));
        assert!(composed.ends_with(';'));
    }
}
