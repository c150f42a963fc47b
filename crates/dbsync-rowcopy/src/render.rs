use dbsync_db::Value;

/// Page size fixed at 100 rows per batch (spec.md §4.6).
pub const PAGE_SIZE: u64 = 100;

/// Renders one [`Value`] as a SQL literal for an `INSERT` statement.
///
/// `Null` renders as the bare keyword; strings are quoted and escaped;
/// numeric variants render as their Rust `Display` form; `Bytes` renders as
/// a hex literal (`X'...'`) rather than re-encoded text, since a BLOB/BINARY
/// payload is not guaranteed to be valid UTF-8 and lossily re-encoding it
/// would silently corrupt the row (spec.md §9: "implementers should fail the
/// row instead" of silently dropping or mangling a value).
pub fn render_literal(value: &Value) -> String {
    match value {
        Value::Int64(n) => n.to_string(),
        Value::UInt64(n) => n.to_string(),
        Value::Float64(f) => f.to_string(),
        Value::Str(s) => quote_string(s),
        Value::Bytes(bytes) => quote_hex(bytes),
        Value::Null => "NULL".to_string(),
    }
}

fn quote_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

fn quote_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2 + 3);
    hex.push_str("X'");
    for byte in bytes {
        hex.push_str(&format!("{byte:02X}"));
    }
    hex.push('\'');
    hex
}

/// Builds the `INSERT` statement for one row given its lexicographically
/// sorted `(column, value)` pairs (spec.md §4.6). When `null_id` is set, the
/// `id` column's value is rendered as `NULL` regardless of the source value,
/// so the destination's own auto-increment sequence assigns it (spec.md
/// §4.6: "id-column auto-increment nulling rule").
pub fn build_insert_sql(table: &str, mut row: Vec<(String, Value)>, null_id: bool) -> String {
    row.sort_by(|a, b| a.0.cmp(&b.0));

    let columns: Vec<String> = row.iter().map(|(name, _)| quote_ident(name)).collect();
    let values: Vec<String> = row
        .iter()
        .map(|(name, value)| {
            if null_id && name.eq_ignore_ascii_case("id") {
                "NULL".to_string()
            } else {
                render_literal(value)
            }
        })
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        columns.join(", "),
        values.join(", ")
    )
}

fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
