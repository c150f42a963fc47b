use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo};

/// A runtime-polymorphic row value, tagged by the column's declared MySQL type.
///
/// spec.md §9 calls out the original implementation's untyped `interface{}`
/// values as a source of bugs when an unrecognized type is silently dropped
/// from an insert. This tagged variant makes every value explicit; a column
/// type this crate doesn't recognize falls back to `Str` (its textual form)
/// rather than being skipped, so an insert never silently loses a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    Str(String),
    Bytes(Vec<u8>),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Decodes a single column of a `MySqlRow` into a `Value`, dispatching on the
/// column's declared type name rather than guessing blind.
pub fn decode_value(row: &MySqlRow, idx: usize) -> Result<Value> {
    let type_name = row.columns()[idx].type_info().name().to_ascii_uppercase();

    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name.as_str() {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "YEAR" => {
            match row.try_get::<i64, _>(idx) {
                Ok(v) => Value::Int64(v),
                Err(_) => Value::UInt64(row.try_get::<u64, _>(idx)?),
            }
        }
        "FLOAT" | "DOUBLE" | "DECIMAL" | "NEWDECIMAL" => Value::Float64(row.try_get(idx)?),
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" | "GEOMETRY" => {
            Value::Bytes(row.try_get(idx)?)
        }
        // `String`'s `Type`/`Decode` impls are only compatible with the
        // VARCHAR/CHAR/TEXT/BLOB family of wire types, not these temporal
        // ones — falling through to the default arm below would fail to
        // decode every row of a `DATE`/`DATETIME`/`TIMESTAMP`/`TIME` column
        // and, since `row_to_map` propagates a single column's decode error
        // as a whole-row failure, silently drop the entire row during copy.
        "DATE" => Value::Str(row.try_get::<NaiveDate, _>(idx)?.to_string()),
        "DATETIME" | "TIMESTAMP" => Value::Str(row.try_get::<NaiveDateTime, _>(idx)?.to_string()),
        "TIME" => Value::Str(row.try_get::<NaiveTime, _>(idx)?.to_string()),
        _ => Value::Str(row.try_get(idx)?),
    };

    Ok(value)
}

/// Decodes every column of a row into a name-sorted-agnostic map, keyed by
/// column name in declaration order (callers sort keys when a stable order
/// is required, per spec.md §4.6).
pub fn row_to_map(row: &MySqlRow) -> Result<Vec<(String, Value)>> {
    let mut out = Vec::with_capacity(row.columns().len());
    for (idx, col) in row.columns().iter().enumerate() {
        out.push((col.name().to_string(), decode_value(row, idx)?));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_round_trips_through_its_rendered_string_form() {
        let original: NaiveDateTime = "2024-03-05 10:15:30".parse().unwrap();
        let rendered = original.to_string();
        let parsed: NaiveDateTime = rendered.parse().unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn date_round_trips_through_its_rendered_string_form() {
        let original: NaiveDate = "2024-03-05".parse().unwrap();
        let rendered = original.to_string();
        let parsed: NaiveDate = rendered.parse().unwrap();
        assert_eq!(parsed, original);
    }
}
