//! Error type for `datapulse-archive`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("object store error: {0}")]
  ObjectStore(#[from] object_store::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("s3 backend requires `{0}`")]
  MissingSetting(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
