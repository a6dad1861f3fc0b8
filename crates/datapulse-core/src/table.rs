//! The tabular model shared by every tier.
//!
//! A table is named by a [`TableRef`] (`layer.name`) and described by an
//! ordered list of [`Column`]s. Rust row structs implement [`Record`] to map
//! themselves to and from a [`Row`] of plain [`Value`]s, which is all a storage
//! backend ever sees.
//!
//! Dates are stored as ISO `YYYY-MM-DD` text and timestamps as RFC 3339 text.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Layers ──────────────────────────────────────────────────────────────────

/// A data-maturity tier. Each layer is its own namespace in the warehouse.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::AsRefStr,
  strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Layer {
  Bronze,
  Silver,
  Gold,
}

/// A fully-qualified table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableRef {
  pub layer: Layer,
  pub name:  &'static str,
}

impl TableRef {
  pub const fn new(layer: Layer, name: &'static str) -> Self {
    Self { layer, name }
  }
}

impl fmt::Display for TableRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}", self.layer, self.name)
  }
}

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Logical column type. Backends choose their own physical representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Integer,
  Real,
  Text,
  /// Calendar date, stored as `YYYY-MM-DD` text.
  Date,
  /// UTC instant, stored as RFC 3339 text.
  Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
  pub name: &'static str,
  pub ty:   ColumnType,
}

impl Column {
  pub const fn new(name: &'static str, ty: ColumnType) -> Self {
    Self { name, ty }
  }
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
}

impl Value {
  fn kind(&self) -> &'static str {
    match self {
      Value::Null => "null",
      Value::Integer(_) => "integer",
      Value::Real(_) => "real",
      Value::Text(_) => "text",
    }
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Value::Integer(v) }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self { Value::Real(v) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Value::Text(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Value::Text(v.to_owned()) }
}

impl From<NaiveDate> for Value {
  fn from(v: NaiveDate) -> Self { Value::Text(v.format("%Y-%m-%d").to_string()) }
}

impl From<DateTime<Utc>> for Value {
  fn from(v: DateTime<Utc>) -> Self { Value::Text(v.to_rfc3339()) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Value::Null, Into::into) }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One decoded row, positionally aligned with a table's [`Column`] list.
///
/// The typed accessors report the offending table and column on mismatch.
#[derive(Debug)]
pub struct Row {
  table:   TableRef,
  columns: &'static [Column],
  values:  Vec<Value>,
}

impl Row {
  pub fn new(
    table: TableRef,
    columns: &'static [Column],
    values: Vec<Value>,
  ) -> Result<Self> {
    if values.len() != columns.len() {
      return Err(Error::Arity {
        table:    table.to_string(),
        expected: columns.len(),
        actual:   values.len(),
      });
    }
    Ok(Self { table, columns, values })
  }

  fn mismatch(&self, idx: usize, expected: &'static str) -> Error {
    Error::ColumnType {
      table: self.table.to_string(),
      column: self.columns[idx].name,
      expected,
      found: self.values[idx].kind(),
    }
  }

  fn null(&self, idx: usize) -> Error {
    Error::UnexpectedNull {
      table:  self.table.to_string(),
      column: self.columns[idx].name,
    }
  }

  pub fn opt_text(&self, idx: usize) -> Result<Option<String>> {
    match &self.values[idx] {
      Value::Null => Ok(None),
      Value::Text(s) => Ok(Some(s.clone())),
      Value::Integer(i) => Ok(Some(i.to_string())),
      Value::Real(r) => Ok(Some(r.to_string())),
    }
  }

  pub fn text(&self, idx: usize) -> Result<String> {
    self.opt_text(idx)?.ok_or_else(|| self.null(idx))
  }

  /// Integers widen to reals; text never coerces.
  pub fn opt_real(&self, idx: usize) -> Result<Option<f64>> {
    match &self.values[idx] {
      Value::Null => Ok(None),
      Value::Real(r) => Ok(Some(*r)),
      Value::Integer(i) => Ok(Some(*i as f64)),
      Value::Text(_) => Err(self.mismatch(idx, "real")),
    }
  }

  pub fn real(&self, idx: usize) -> Result<f64> {
    self.opt_real(idx)?.ok_or_else(|| self.null(idx))
  }

  pub fn opt_integer(&self, idx: usize) -> Result<Option<i64>> {
    match &self.values[idx] {
      Value::Null => Ok(None),
      Value::Integer(i) => Ok(Some(*i)),
      _ => Err(self.mismatch(idx, "integer")),
    }
  }

  pub fn integer(&self, idx: usize) -> Result<i64> {
    self.opt_integer(idx)?.ok_or_else(|| self.null(idx))
  }

  pub fn opt_date(&self, idx: usize) -> Result<Option<NaiveDate>> {
    match &self.values[idx] {
      Value::Null => Ok(None),
      Value::Text(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| Error::DateParse(format!("{s:?}: {e}"))),
      _ => Err(self.mismatch(idx, "date")),
    }
  }

  pub fn date(&self, idx: usize) -> Result<NaiveDate> {
    self.opt_date(idx)?.ok_or_else(|| self.null(idx))
  }

  pub fn timestamp(&self, idx: usize) -> Result<DateTime<Utc>> {
    match &self.values[idx] {
      Value::Null => Err(self.null(idx)),
      Value::Text(s) => DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::DateParse(format!("{s:?}: {e}"))),
      _ => Err(self.mismatch(idx, "timestamp")),
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A Rust struct that is one row of a warehouse table.
pub trait Record: Sized + Send + 'static {
  const TABLE: TableRef;
  const COLUMNS: &'static [Column];

  /// Values in [`Record::COLUMNS`] order.
  fn to_row(&self) -> Vec<Value>;

  fn from_row(row: &Row) -> Result<Self>;

  /// Whether the table declares a column called `name`.
  fn has_column(name: &str) -> bool {
    Self::COLUMNS.iter().any(|c| c.name == name)
  }
}
