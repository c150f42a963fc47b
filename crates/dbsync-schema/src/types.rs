use std::collections::HashMap;

/// Reserved key under which the primary key index is stored, so it is
/// always comparable across two parsed schemas regardless of what MySQL
/// happens to name it (spec.md §3 invariant).
pub const PRIMARY_KEY_NAME: &str = "PRIMARY";

/// Kind of index, mirroring the three forms spec.md §4.2 recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Primary,
    Unique,
    Plain,
    Fulltext,
}

/// A single column, keyed by name in `TableSchema::columns`.
///
/// `definition` is the full, whitespace-normalized clause text (e.g.
/// `` `name` varchar(32) DEFAULT NULL ``). Comparison is always on this
/// text, never on a re-derived type/nullability pair (spec.md §9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub definition: String,
}

/// An index or primary-key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub kind: IndexKind,
    pub columns: Vec<String>,
    pub definition: String,
}

/// A foreign-key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Foreign {
    pub name: String,
    pub local_columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub definition: String,
}

/// A table's schema, parsed from its canonical `CREATE TABLE` statement.
///
/// Columns preserve declaration order; indexes and foreign keys are keyed
/// by name (the primary key, if present, always under [`PRIMARY_KEY_NAME`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    pub columns: Vec<Column>,
    pub indexes: HashMap<String, Index>,
    pub foreign_keys: HashMap<String, Foreign>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&Index> {
        self.indexes.get(PRIMARY_KEY_NAME)
    }
}
