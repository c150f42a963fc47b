//! Run configuration (ambient, SPEC_FULL.md §4.7): TOML file plus DSN
//! environment overrides, table allow/ignore patterns, per-table overrides.

mod config;
mod raw;

pub use config::Config;
pub use raw::TableOverrides;
