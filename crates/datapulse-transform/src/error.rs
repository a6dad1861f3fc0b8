//! Error type for `datapulse-transform`.

use datapulse_core::TableRef;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("warehouse error: {0}")]
  Warehouse(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("upstream table {0} does not exist")]
  MissingTable(TableRef),

  #[error("invalid plan: step {step} reads {input}, which no earlier step produces")]
  InvalidPlan { step: String, input: TableRef },
}

impl Error {
  pub fn warehouse<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Warehouse(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
