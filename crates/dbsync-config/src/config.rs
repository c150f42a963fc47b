use std::collections::HashMap;
use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use crate::raw::{RawConfig, TableOverrides};

/// `DBSYNC_SOURCE_DSN`/`DBSYNC_DEST_DSN` take precedence over the TOML file
/// when set (spec.md §4.7: "env wins, the file is a convenience").
const SOURCE_DSN_VAR: &str = "DBSYNC_SOURCE_DSN";
const DEST_DSN_VAR: &str = "DBSYNC_DEST_DSN";

/// Validated, ready-to-use run configuration.
pub struct Config {
    pub source_dsn: String,
    pub dest_dsn: String,
    pub drop: bool,
    pub sync: bool,
    pub sync_data_tables: Vec<String>,
    pub sync_data_truncate: bool,
    pub webhook_url: Option<String>,
    allow_tables: Vec<Regex>,
    ignore_tables: Vec<Regex>,
    tables: HashMap<String, TableOverrides>,
}

impl Config {
    /// Reads `path` as TOML, applies `.env`/environment DSN overrides, and
    /// validates the result (spec.md §4.7).
    pub fn load(path: &Path) -> Result<Config> {
        dotenvy::dotenv().ok();

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file `{}`", path.display()))?;
        let raw: RawConfig =
            toml::from_str(&text).with_context(|| format!("parsing config file `{}`", path.display()))?;

        Config::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Config> {
        let source_dsn = env::var(SOURCE_DSN_VAR)
            .ok()
            .or(raw.source_dsn)
            .context("no source DSN: set `source_dsn` in the config file or DBSYNC_SOURCE_DSN")?;
        let dest_dsn = env::var(DEST_DSN_VAR)
            .ok()
            .or(raw.dest_dsn)
            .context("no destination DSN: set `dest_dsn` in the config file or DBSYNC_DEST_DSN")?;

        let allow_tables = compile_patterns(&raw.allow_tables).context("compiling allow_tables")?;
        let ignore_tables = compile_patterns(&raw.ignore_tables).context("compiling ignore_tables")?;

        Ok(Config {
            source_dsn,
            dest_dsn,
            drop: raw.drop,
            sync: raw.sync,
            sync_data_tables: raw.sync_data_tables,
            sync_data_truncate: raw.sync_data_truncate,
            webhook_url: raw.webhook_url,
            allow_tables,
            ignore_tables,
            tables: raw.tables,
        })
    }

    /// Whether `table` should be considered this run: matched by at least
    /// one allow pattern (or no allow patterns configured, meaning "all
    /// tables"), and matched by no ignore pattern (spec.md §3).
    pub fn table_is_selected(&self, table: &str) -> bool {
        let allowed = self.allow_tables.is_empty() || self.allow_tables.iter().any(|re| re.is_match(table));
        let ignored = self.ignore_tables.iter().any(|re| re.is_match(table));
        allowed && !ignored
    }

    /// Per-table ignore lists for `table`, or the empty default when the
    /// config has no `[tables.<name>]` section for it.
    pub fn overrides_for(&self, table: &str) -> TableOverrides {
        self.tables.get(table).cloned().unwrap_or_default()
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).with_context(|| format!("invalid pattern `{pattern}`")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allow_list_selects_everything_not_ignored() {
        let raw = RawConfig {
            source_dsn: Some("mysql://s".to_string()),
            dest_dsn: Some("mysql://d".to_string()),
            ignore_tables: vec!["^tmp_".to_string()],
            ..Default::default()
        };
        let config = Config::from_raw(raw).unwrap();
        assert!(config.table_is_selected("users"));
        assert!(!config.table_is_selected("tmp_scratch"));
    }

    #[test]
    fn allow_list_restricts_to_matching_tables() {
        let raw = RawConfig {
            source_dsn: Some("mysql://s".to_string()),
            dest_dsn: Some("mysql://d".to_string()),
            allow_tables: vec!["^app_".to_string()],
            ..Default::default()
        };
        let config = Config::from_raw(raw).unwrap();
        assert!(config.table_is_selected("app_users"));
        assert!(!config.table_is_selected("users"));
    }

    #[test]
    fn missing_dsn_is_a_validation_error() {
        let raw = RawConfig::default();
        assert!(Config::from_raw(raw).is_err());
    }
}
