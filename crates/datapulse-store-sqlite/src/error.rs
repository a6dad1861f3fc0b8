//! Error type for `datapulse-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] datapulse_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// Read from a table that was never created.
  #[error("table not found: {0}")]
  MissingTable(String),

  #[error("unsupported value in {table}.{column}: {kind}")]
  UnsupportedValue {
    table:  String,
    column: &'static str,
    kind:   &'static str,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
