//! Conversions between `datapulse_core` values and SQLite storage values.
//!
//! Dates and timestamps are already text by the time they reach this layer
//! (see `datapulse_core::table`), so the mapping is one-to-one.

use datapulse_core::{Column, ColumnType, Row, TableRef, Value};
use rusqlite::types::Value as SqlValue;

use crate::{Error, Result};

pub fn sql_type(ty: ColumnType) -> &'static str {
  match ty {
    ColumnType::Integer => "INTEGER",
    ColumnType::Real => "REAL",
    ColumnType::Text | ColumnType::Date | ColumnType::Timestamp => "TEXT",
  }
}

pub fn encode_value(v: Value) -> SqlValue {
  match v {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(i),
    Value::Real(r) => SqlValue::Real(r),
    Value::Text(s) => SqlValue::Text(s),
  }
}

pub fn encode_row(values: Vec<Value>) -> Vec<SqlValue> {
  values.into_iter().map(encode_value).collect()
}

/// Decode one raw SQLite row into a [`Row`] for `table`.
pub fn decode_row(
  table: TableRef,
  columns: &'static [Column],
  raw: Vec<SqlValue>,
) -> Result<Row> {
  let values = raw
    .into_iter()
    .zip(columns)
    .map(|(v, col)| match v {
      SqlValue::Null => Ok(Value::Null),
      SqlValue::Integer(i) => Ok(Value::Integer(i)),
      SqlValue::Real(r) => Ok(Value::Real(r)),
      SqlValue::Text(s) => Ok(Value::Text(s)),
      SqlValue::Blob(_) => Err(Error::UnsupportedValue {
        table:  table.to_string(),
        column: col.name,
        kind:   "blob",
      }),
    })
    .collect::<Result<Vec<_>>>()?;

  Ok(Row::new(table, columns, values)?)
}
