//! Diff Engine (spec.md §4.3): compares a table's source and destination
//! schemas and produces a single [`TableAlterData`].

use dbsync_schema::{parse_create_table, Foreign, Index, IndexKind, TableSchema, PRIMARY_KEY_NAME};

/// Kind of change a [`TableAlterData`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterKind {
    None,
    Create,
    Drop,
    Alter,
}

/// The two parsed schemas a diff was computed from.
#[derive(Debug, Clone, Default)]
pub struct SchemaDiff {
    pub source: Option<TableSchema>,
    pub dest: Option<TableSchema>,
}

/// Result of diffing one table (spec.md §3).
#[derive(Debug, Clone)]
pub struct TableAlterData {
    pub table: String,
    pub kind: AlterKind,
    pub statement: String,
    pub diff: SchemaDiff,
}

impl TableAlterData {
    /// Union of tables referenced by a foreign key on either side of this
    /// diff, excluding this table itself (spec.md §3, "Related-tables set").
    pub fn related_tables(&self) -> Vec<String> {
        let mut related: Vec<String> = Vec::new();
        for schema in [&self.diff.source, &self.diff.dest].into_iter().flatten() {
            for fk in schema.foreign_keys.values() {
                if fk.referenced_table != self.table && !related.contains(&fk.referenced_table) {
                    related.push(fk.referenced_table.clone());
                }
            }
        }
        related.sort();
        related
    }
}

/// Per-table name filters applied on both sides of a diff (spec.md §3).
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreLists<'a> {
    pub columns: &'a [String],
    pub indexes: &'a [String],
    pub foreign_keys: &'a [String],
}

fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

fn is_ignored(list: &[String], name: &str) -> bool {
    list.iter().any(|n| n == name)
}

/// Computes the alter data for one table given its source and destination
/// canonical `CREATE TABLE` statements (empty string meaning the table does
/// not exist on that side, per the Schema Reader's contract).
pub fn diff(
    table: &str,
    source_ddl: &str,
    dest_ddl: &str,
    drop: bool,
    ignore: IgnoreLists<'_>,
) -> TableAlterData {
    let source = parse_create_table(source_ddl);
    let dest = parse_create_table(dest_ddl);

    match (&source, &dest) {
        (None, None) => TableAlterData {
            table: table.to_string(),
            kind: AlterKind::None,
            statement: String::new(),
            diff: SchemaDiff { source, dest },
        },
        (None, Some(_)) => TableAlterData {
            table: table.to_string(),
            kind: AlterKind::Drop,
            statement: format!("drop table {};", quote_ident(table)),
            diff: SchemaDiff { source, dest },
        },
        (Some(_), None) => TableAlterData {
            table: table.to_string(),
            kind: AlterKind::Create,
            statement: format!("{};", source_ddl.trim_end_matches(';').trim()),
            diff: SchemaDiff { source, dest },
        },
        (Some(src), Some(dst)) => {
            let lines = alter_lines(src, dst, drop, ignore);
            if lines.is_empty() {
                TableAlterData {
                    table: table.to_string(),
                    kind: AlterKind::None,
                    statement: String::new(),
                    diff: SchemaDiff { source, dest },
                }
            } else {
                let statement = format!(
                    "ALTER TABLE {}\n{};",
                    quote_ident(table),
                    lines.join(",\n")
                );
                TableAlterData {
                    table: table.to_string(),
                    kind: AlterKind::Alter,
                    statement,
                    diff: SchemaDiff { source, dest },
                }
            }
        }
    }
}

/// Builds the fixed-order clause list: column changes, column drops, index
/// changes, index drops, foreign-key changes, foreign-key drops (spec.md
/// §4.3 — "this ordering is contractual").
fn alter_lines(
    src: &TableSchema,
    dst: &TableSchema,
    drop: bool,
    ignore: IgnoreLists<'_>,
) -> Vec<String> {
    let mut lines = Vec::new();

    // Column changes: ADD for new columns, CHANGE for columns whose text differs.
    for col in &src.columns {
        if is_ignored(ignore.columns, &col.name) {
            continue;
        }
        match dst.get_column(&col.name) {
            Some(dst_col) if dst_col.definition != col.definition => {
                lines.push(format!(
                    "CHANGE {} {}",
                    quote_ident(&col.name),
                    strip_name_prefix(&col.definition, &col.name)
                ));
            }
            Some(_) => {}
            None => lines.push(format!("ADD {}", col.definition)),
        }
    }

    // Column drops.
    if drop {
        for col in &dst.columns {
            if is_ignored(ignore.columns, &col.name) {
                continue;
            }
            if src.get_column(&col.name).is_none() {
                lines.push(format!("DROP {}", quote_ident(&col.name)));
            }
        }
    }

    // Index changes.
    let mut src_index_names: Vec<&String> = src.indexes.keys().collect();
    src_index_names.sort();
    for name in src_index_names {
        if is_ignored(ignore.indexes, name) {
            continue;
        }
        let idx = &src.indexes[name];
        match dst.indexes.get(name) {
            Some(dst_idx) if dst_idx.definition != idx.definition => {
                lines.push(format!("{}, {}", index_drop_form(idx), index_add_form(idx)));
            }
            Some(_) => {}
            None => lines.push(index_add_form(idx)),
        }
    }

    // Index drops.
    if drop {
        let mut dst_index_names: Vec<&String> = dst.indexes.keys().collect();
        dst_index_names.sort();
        for name in dst_index_names {
            if is_ignored(ignore.indexes, name) {
                continue;
            }
            if !src.indexes.contains_key(name) {
                lines.push(index_drop_form(&dst.indexes[name]));
            }
        }
    }

    // Foreign-key changes.
    let mut src_fk_names: Vec<&String> = src.foreign_keys.keys().collect();
    src_fk_names.sort();
    for name in src_fk_names {
        if is_ignored(ignore.foreign_keys, name) {
            continue;
        }
        let fk = &src.foreign_keys[name];
        match dst.foreign_keys.get(name) {
            Some(dst_fk) if dst_fk.definition != fk.definition => {
                lines.push(format!("{}, {}", fk_drop_form(fk), fk_add_form(fk)));
            }
            Some(_) => {}
            None => lines.push(fk_add_form(fk)),
        }
    }

    // Foreign-key drops.
    if drop {
        let mut dst_fk_names: Vec<&String> = dst.foreign_keys.keys().collect();
        dst_fk_names.sort();
        for name in dst_fk_names {
            if is_ignored(ignore.foreign_keys, name) {
                continue;
            }
            if !src.foreign_keys.contains_key(name) {
                lines.push(fk_drop_form(&dst.foreign_keys[name]));
            }
        }
    }

    lines
}

/// Strips a column definition's leading `` `name` `` so it can be recombined
/// as `CHANGE \`name\` <rest>` (spec.md §8 scenario S3).
fn strip_name_prefix(definition: &str, name: &str) -> String {
    let prefix = quote_ident(name);
    definition
        .strip_prefix(&prefix)
        .unwrap_or(definition)
        .trim_start()
        .to_string()
}

fn index_add_form(idx: &Index) -> String {
    format!("ADD {}", idx.definition)
}

fn index_drop_form(idx: &Index) -> String {
    if idx.kind == IndexKind::Primary {
        "DROP PRIMARY KEY".to_string()
    } else {
        format!("DROP INDEX {}", quote_ident(&idx.name))
    }
}

fn fk_add_form(fk: &Foreign) -> String {
    format!("ADD {}", fk.definition)
}

fn fk_drop_form(fk: &Foreign) -> String {
    format!("DROP FOREIGN KEY {}", quote_ident(&fk.name))
}

#[allow(dead_code)]
const _ASSERT_PRIMARY_NAME: &str = PRIMARY_KEY_NAME;

#[cfg(test)]
mod tests {
    use super::*;

    fn ignore_none() -> IgnoreLists<'static> {
        IgnoreLists::default()
    }

    #[test]
    fn s1_new_table_is_create() {
        let source = "CREATE TABLE `users` (\n  `id` int NOT NULL,\n  `name` varchar(32) DEFAULT NULL,\n  PRIMARY KEY (`id`)\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";
        let alter = diff("users", source, "", false, ignore_none());
        assert_eq!(alter.kind, AlterKind::Create);
        assert!(alter.statement.starts_with("CREATE TABLE"));
    }

    #[test]
    fn table_absent_on_both_sides_is_none() {
        let alter = diff("ghost", "", "", false, ignore_none());
        assert_eq!(alter.kind, AlterKind::None);
        assert_eq!(alter.statement, "");
    }

    #[test]
    fn table_only_in_dest_is_drop() {
        let dest = "CREATE TABLE `legacy` (\n  `id` int NOT NULL\n) ENGINE=InnoDB";
        let alter = diff("legacy", "", dest, false, ignore_none());
        assert_eq!(alter.kind, AlterKind::Drop);
        assert_eq!(alter.statement, "drop table `legacy`;");
    }

    #[test]
    fn s2_add_column_then_idempotent() {
        let source = "CREATE TABLE `t` (\n  `id` int NOT NULL,\n  `a` int DEFAULT NULL,\n  `b` int DEFAULT NULL\n) ENGINE=InnoDB";
        let dest = "CREATE TABLE `t` (\n  `id` int NOT NULL,\n  `a` int DEFAULT NULL\n) ENGINE=InnoDB";
        let alter = diff("t", source, dest, false, ignore_none());
        assert_eq!(alter.kind, AlterKind::Alter);
        assert!(alter.statement.contains("ADD `b` int"));

        // second run: dest now matches source, kind must be none.
        let alter2 = diff("t", source, source, false, ignore_none());
        assert_eq!(alter2.kind, AlterKind::None);
    }

    #[test]
    fn s3_change_column_drop_disabled_preserves_extra_column() {
        let source = "CREATE TABLE `t` (\n  `id` int NOT NULL,\n  `a` varchar(10) DEFAULT NULL\n) ENGINE=InnoDB";
        let dest = "CREATE TABLE `t` (\n  `id` int NOT NULL,\n  `a` varchar(5) DEFAULT NULL,\n  `old` int DEFAULT NULL\n) ENGINE=InnoDB";
        let alter = diff("t", source, dest, false, ignore_none());
        assert_eq!(alter.kind, AlterKind::Alter);
        assert_eq!(alter.statement, "ALTER TABLE `t`\nCHANGE `a` varchar(10) DEFAULT NULL;");
        assert!(!alter.statement.contains("DROP"));
    }

    #[test]
    fn s4_drop_column_when_enabled() {
        let source = "CREATE TABLE `t` (\n  `id` int NOT NULL,\n  `a` varchar(10) DEFAULT NULL\n) ENGINE=InnoDB";
        let dest = "CREATE TABLE `t` (\n  `id` int NOT NULL,\n  `a` varchar(5) DEFAULT NULL,\n  `old` int DEFAULT NULL\n) ENGINE=InnoDB";
        let alter = diff("t", source, dest, true, ignore_none());
        assert_eq!(alter.kind, AlterKind::Alter);
        let change_pos = alter.statement.find("CHANGE `a`").unwrap();
        let drop_pos = alter.statement.find("DROP `old`").unwrap();
        assert!(change_pos < drop_pos);
    }

    #[test]
    fn drop_safety_never_emits_drop_when_disabled() {
        let source = "CREATE TABLE `t` (\n  `id` int NOT NULL\n) ENGINE=InnoDB";
        let dest = "CREATE TABLE `t` (\n  `id` int NOT NULL,\n  `old` int DEFAULT NULL\n) ENGINE=InnoDB";
        let alter = diff("t", source, dest, false, ignore_none());
        assert!(!alter.statement.contains("DROP"));
    }

    #[test]
    fn ignored_column_untouched_on_both_sides() {
        let source = "CREATE TABLE `t` (\n  `id` int NOT NULL,\n  `a` int DEFAULT NULL\n) ENGINE=InnoDB";
        let dest = "CREATE TABLE `t` (\n  `id` int NOT NULL\n) ENGINE=InnoDB";
        let ignore = IgnoreLists {
            columns: &["a".to_string()],
            ..Default::default()
        };
        let alter = diff("t", source, dest, false, ignore);
        assert_eq!(alter.kind, AlterKind::None);
    }

    #[test]
    fn auto_increment_trailer_is_neutral() {
        let source = "CREATE TABLE `t` (\n  `id` int NOT NULL AUTO_INCREMENT,\n  PRIMARY KEY (`id`)\n) ENGINE=InnoDB AUTO_INCREMENT=12 DEFAULT CHARSET=utf8mb4";
        let dest = "CREATE TABLE `t` (\n  `id` int NOT NULL AUTO_INCREMENT,\n  PRIMARY KEY (`id`)\n) ENGINE=InnoDB AUTO_INCREMENT=99 DEFAULT CHARSET=utf8mb4";
        let alter = diff("t", source, dest, true, ignore_none());
        assert_eq!(alter.kind, AlterKind::None);
    }

    #[test]
    fn related_tables_union_excludes_self() {
        let source = "CREATE TABLE `orders` (\n  `id` int NOT NULL,\n  `user_id` int NOT NULL,\n  CONSTRAINT `fk_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`)\n) ENGINE=InnoDB";
        let alter = diff("orders", source, "", false, ignore_none());
        assert_eq!(alter.related_tables(), vec!["users".to_string()]);
    }
}
