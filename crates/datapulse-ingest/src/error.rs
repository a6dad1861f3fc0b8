//! Error type for `datapulse-ingest`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("GET {url} → {status}")]
  Status { url: String, status: u16 },

  #[error("invalid url: {0}")]
  Url(String),

  #[error("invalid selector {0}")]
  Selector(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("spreadsheet error: {0}")]
  Spreadsheet(#[from] calamine::Error),

  #[error("input file not found: {0}")]
  MissingFile(PathBuf),

  #[error("workbook has no worksheet or no header row: {0}")]
  EmptyWorkbook(PathBuf),

  #[error("spreadsheet header is missing required column {0:?}")]
  MissingHeader(&'static str),

  #[error("warehouse error: {0}")]
  Warehouse(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("connectors failed: {}", .0.join(", "))]
  ConnectorsFailed(Vec<String>),
}

impl Error {
  /// Box a backend-specific warehouse error.
  pub fn warehouse<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Warehouse(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
