use std::collections::HashMap;

use serde::Deserialize;

/// Per-table ignore lists, keyed by table name in the `[tables.*]` TOML
/// sections (spec.md §3, "Config").
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TableOverrides {
    #[serde(default)]
    pub ignore_columns: Vec<String>,
    #[serde(default)]
    pub ignore_indexes: Vec<String>,
    #[serde(default)]
    pub ignore_foreign_keys: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Deserialized shape of `dbsync.toml`, before DSN env overrides and regex
/// compilation are applied.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    pub source_dsn: Option<String>,
    pub dest_dsn: Option<String>,
    #[serde(default)]
    pub drop: bool,
    /// When false, diffs are computed and reported but never applied
    /// (spec.md §3, "sync").
    #[serde(default = "default_true")]
    pub sync: bool,
    #[serde(default)]
    pub allow_tables: Vec<String>,
    #[serde(default)]
    pub ignore_tables: Vec<String>,
    #[serde(default)]
    pub sync_data_tables: Vec<String>,
    #[serde(default)]
    pub sync_data_truncate: bool,
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub tables: HashMap<String, TableOverrides>,
}

impl Default for RawConfig {
    fn default() -> Self {
        RawConfig {
            source_dsn: None,
            dest_dsn: None,
            drop: false,
            sync: true,
            allow_tables: Vec::new(),
            ignore_tables: Vec::new(),
            sync_data_tables: Vec::new(),
            sync_data_truncate: false,
            webhook_url: None,
            tables: HashMap::new(),
        }
    }
}
