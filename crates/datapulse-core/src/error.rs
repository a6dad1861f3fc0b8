//! Error types for `datapulse-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{table}: expected {expected} columns, got {actual}")]
  Arity {
    table:    String,
    expected: usize,
    actual:   usize,
  },

  #[error("{table}.{column}: expected {expected}, found {found}")]
  ColumnType {
    table:    String,
    column:   &'static str,
    expected: &'static str,
    found:    &'static str,
  },

  #[error("{table}.{column}: unexpected null")]
  UnexpectedNull {
    table:  String,
    column: &'static str,
  },

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
