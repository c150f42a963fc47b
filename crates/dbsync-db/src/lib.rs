//! Database connection pooling and schema introspection (Schema Reader,
//! spec.md §4.1) for dbsync.

mod connect;
mod reader;
mod value;

pub use connect::{connect, DbPool};
pub use reader::{fetch_schema, has_auto_increment, list_tables, quote_ident, table_status};
pub use value::{decode_value, row_to_map, Value};
