use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Keeps a destination MySQL-dialect schema aligned with a source, and
/// optionally copies row data for a configured subset of tables (spec.md
/// §6).
#[derive(Parser)]
#[command(name = "dbsync", version, about)]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = "dbsync.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Diff and apply schema changes for the selected tables.
    SyncSchema,
    /// Diff and apply schema changes, then copy row data for the tables
    /// configured under `sync_data_tables`.
    SyncData,
}
