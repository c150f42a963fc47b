//! Parses a canonical `SHOW CREATE TABLE` statement into a [`TableSchema`]
//! (spec.md §4.2).
//!
//! Parsing never re-derives columns into a typed AST: every clause is kept
//! as normalized text and equality is a textual comparison (spec.md §9).
//! This mirrors the approach the rest of this pack's DDL parsers take for
//! extracting a table body and splitting it at comma boundaries while
//! respecting nested parentheses and quoted string literals.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Column, Foreign, Index, IndexKind, TableSchema, PRIMARY_KEY_NAME};

static PRIMARY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^PRIMARY\s+KEY\s*\(([^)]+)\)").unwrap());

static NAMED_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)^(UNIQUE\s+)?(FULLTEXT\s+)?KEY\s+`?([^`\s(]+)`?\s*\(([^)]+)\)"#).unwrap()
});

static FOREIGN_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)^CONSTRAINT\s+`?([^`\s]+)`?\s+FOREIGN\s+KEY\s*\(([^)]+)\)\s*REFERENCES\s+`?([^`\s(]+)`?\s*\(([^)]+)\)"#,
    )
    .unwrap()
});

/// Parses the column/index/foreign-key clauses out of a `CREATE TABLE`
/// statement. Returns `None` if `stmt` is empty (the table did not exist,
/// per spec.md §4.1) — callers treat that as "no schema" rather than a
/// parse failure.
pub fn parse_create_table(stmt: &str) -> Option<TableSchema> {
    if stmt.trim().is_empty() {
        return None;
    }

    let body = extract_table_body(stmt)?;
    let mut schema = TableSchema::new();

    for clause in split_clauses(&body) {
        let clause = normalize_whitespace(&clause);
        if clause.is_empty() {
            continue;
        }
        classify_clause(&clause, &mut schema);
    }

    Some(schema)
}

fn classify_clause(clause: &str, schema: &mut TableSchema) {
    if let Some(caps) = PRIMARY_KEY_RE.captures(clause) {
        schema.indexes.insert(
            PRIMARY_KEY_NAME.to_string(),
            Index {
                name: PRIMARY_KEY_NAME.to_string(),
                kind: IndexKind::Primary,
                columns: parse_column_list(&caps[1]),
                definition: clause.to_string(),
            },
        );
        return;
    }

    if let Some(caps) = NAMED_INDEX_RE.captures(clause) {
        let is_unique = caps.get(1).is_some();
        let is_fulltext = caps.get(2).is_some();
        let name = caps[3].to_string();
        let kind = if is_fulltext {
            IndexKind::Fulltext
        } else if is_unique {
            IndexKind::Unique
        } else {
            IndexKind::Plain
        };
        schema.indexes.insert(
            name.clone(),
            Index {
                name,
                kind,
                columns: parse_column_list(&caps[4]),
                definition: clause.to_string(),
            },
        );
        return;
    }

    if let Some(caps) = FOREIGN_KEY_RE.captures(clause) {
        let name = caps[1].to_string();
        schema.foreign_keys.insert(
            name.clone(),
            Foreign {
                name,
                local_columns: parse_column_list(&caps[2]),
                referenced_table: caps[3].to_string(),
                referenced_columns: parse_column_list(&caps[4]),
                definition: clause.to_string(),
            },
        );
        return;
    }

    if let Some(name) = backticked_identifier(clause) {
        schema.columns.push(Column {
            name,
            definition: clause.to_string(),
        });
    }
}

/// Returns the identifier if `clause` starts with a backticked name, the
/// signature of a column clause per spec.md §4.2 rule 2.
fn backticked_identifier(clause: &str) -> Option<String> {
    let rest = clause.strip_prefix('`')?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Splits a comma-separated column list, stripping backtick quoting.
fn parse_column_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|c| c.trim().trim_matches('`').to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts the statement body between the first `(` following the table
/// name and its matching `)`, discarding everything before and the engine
/// options trailer after (spec.md §4.2 rule 1).
fn extract_table_body(stmt: &str) -> Option<String> {
    let bytes = stmt.as_bytes();
    let mut depth = 0i32;
    let mut start = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if b == b'\\' && in_string {
            escape_next = true;
            continue;
        }
        if b == b'\'' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        if b == b'(' {
            if depth == 0 {
                start = Some(i + 1);
            }
            depth += 1;
        } else if b == b')' {
            depth -= 1;
            if depth == 0 {
                if let Some(s) = start {
                    return Some(stmt[s..i].to_string());
                }
            }
        }
    }

    None
}

/// Splits a table body into its comma-separated clauses, respecting nested
/// parentheses and single-quoted string literals (spec.md §4.2 rule 2:
/// "top-level comma-separated clause").
fn split_clauses(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for ch in body.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }
        if ch == '\\' && in_string {
            current.push(ch);
            escape_next = true;
            continue;
        }
        if ch == '\'' {
            in_string = !in_string;
            current.push(ch);
            continue;
        }
        if in_string {
            current.push(ch);
            continue;
        }
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        parts.push(current);
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS: &str = "CREATE TABLE `users` (\n  `id` int NOT NULL AUTO_INCREMENT,\n  `name` varchar(32) DEFAULT NULL,\n  PRIMARY KEY (`id`)\n) ENGINE=InnoDB AUTO_INCREMENT=5 DEFAULT CHARSET=utf8mb4";

    #[test]
    fn parses_columns_in_order() {
        let schema = parse_create_table(USERS).unwrap();
        let names: Vec<_> = schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn parses_primary_key_under_reserved_name() {
        let schema = parse_create_table(USERS).unwrap();
        let pk = schema.primary_key().unwrap();
        assert_eq!(pk.kind, IndexKind::Primary);
        assert_eq!(pk.columns, vec!["id"]);
    }

    #[test]
    fn trailer_is_discarded() {
        let a = parse_create_table(USERS).unwrap();
        let b = parse_create_table(&USERS.replace("AUTO_INCREMENT=5", "AUTO_INCREMENT=99")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_statement_is_none() {
        assert!(parse_create_table("").is_none());
    }

    #[test]
    fn parses_named_unique_index_and_foreign_key() {
        let stmt = "CREATE TABLE `orders` (\n  `id` int NOT NULL,\n  `user_id` int NOT NULL,\n  UNIQUE KEY `uniq_id` (`id`),\n  CONSTRAINT `fk_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`)\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";
        let schema = parse_create_table(stmt).unwrap();

        let idx = schema.indexes.get("uniq_id").unwrap();
        assert_eq!(idx.kind, IndexKind::Unique);
        assert_eq!(idx.columns, vec!["id"]);

        let fk = schema.foreign_keys.get("fk_user").unwrap();
        assert_eq!(fk.local_columns, vec!["user_id"]);
        assert_eq!(fk.referenced_table, "users");
        assert_eq!(fk.referenced_columns, vec!["id"]);
    }
}
