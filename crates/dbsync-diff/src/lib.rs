//! Diff Engine and Grouping & Scheduler (spec.md §4.3-§4.4).

mod diff;
mod schedule;

pub use diff::{diff, AlterKind, IgnoreLists, SchemaDiff, TableAlterData};
pub use schedule::{compose_group_statement, plan, Group, Plan};
