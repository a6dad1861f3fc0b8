//! Object-storage containers for DataPulse.
//!
//! Three named containers exist: the raw-data archive (bronze payload
//! mirrors), derived exports (gold tables as JSON), and backups. Each maps to
//! one bucket of an S3-compatible service (MinIO in the reference
//! deployment), one directory on the local filesystem, or an in-memory store
//! for tests.

pub mod error;

use std::{path::PathBuf, sync::Arc};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use object_store::{
  ObjectStore, PutPayload, aws::AmazonS3Builder, local::LocalFileSystem,
  memory::InMemory, path::Path as ObjectPath,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub use error::{Error, Result};

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// One directory per container under `root`.
  #[default]
  Local,
  /// S3-compatible endpoint; buckets must already exist.
  S3,
  Memory,
}

/// Archive settings, deserialised from the `[archive]` config section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
  pub backend:        Backend,
  pub root:           PathBuf,
  pub raw_bucket:     String,
  pub exports_bucket: String,
  pub backups_bucket: String,
  pub endpoint:       Option<String>,
  pub access_key:     Option<String>,
  pub secret_key:     Option<String>,
  pub region:         String,
  pub allow_http:     bool,
}

impl Default for ArchiveConfig {
  fn default() -> Self {
    Self {
      backend:        Backend::Local,
      root:           PathBuf::from("data/archive"),
      raw_bucket:     "bronze".into(),
      exports_bucket: "data-exports".into(),
      backups_bucket: "backups".into(),
      endpoint:       None,
      access_key:     None,
      secret_key:     None,
      region:         "us-east-1".into(),
      allow_http:     false,
    }
  }
}

impl ArchiveConfig {
  fn bucket(&self, container: Container) -> &str {
    match container {
      Container::Raw => &self.raw_bucket,
      Container::Exports => &self.exports_bucket,
      Container::Backups => &self.backups_bucket,
    }
  }
}

// ─── Containers ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Container {
  Raw,
  Exports,
  Backups,
}

/// Handle on the three containers. Cheap to clone.
#[derive(Clone)]
pub struct Archive {
  raw:     Arc<dyn ObjectStore>,
  exports: Arc<dyn ObjectStore>,
  backups: Arc<dyn ObjectStore>,
}

impl Archive {
  /// Build the archive described by `config`. Local container directories
  /// are created if absent.
  pub async fn open(config: &ArchiveConfig) -> Result<Self> {
    let raw = open_container(config, Container::Raw).await?;
    let exports = open_container(config, Container::Exports).await?;
    let backups = open_container(config, Container::Backups).await?;
    tracing::debug!(backend = ?config.backend, "archive ready");
    Ok(Self { raw, exports, backups })
  }

  pub fn in_memory() -> Self {
    Self {
      raw:     Arc::new(InMemory::new()),
      exports: Arc::new(InMemory::new()),
      backups: Arc::new(InMemory::new()),
    }
  }

  fn store(&self, container: Container) -> &Arc<dyn ObjectStore> {
    match container {
      Container::Raw => &self.raw,
      Container::Exports => &self.exports,
      Container::Backups => &self.backups,
    }
  }

  /// Serialise `value` as pretty JSON and store it at `key`, replacing any
  /// previous object. Returns the payload size in bytes.
  pub async fn put_json<T: Serialize + ?Sized>(
    &self,
    container: Container,
    key: &str,
    value: &T,
  ) -> Result<usize> {
    let body = serde_json::to_vec_pretty(value)?;
    let len = body.len();
    self
      .store(container)
      .put(&ObjectPath::from(key), PutPayload::from(Bytes::from(body)))
      .await?;
    tracing::debug!(%container, key, bytes = len, "stored object");
    Ok(len)
  }

  /// Store `value` in the backups container as
  /// `<prefix>_<YYYYmmdd_HHMMSS>.json`. Returns the key written.
  pub async fn backup_json<T: Serialize + ?Sized>(&self, prefix: &str, value: &T) -> Result<String> {
    let key = backup_key(prefix, Utc::now());
    self.put_json(Container::Backups, &key, value).await?;
    Ok(key)
  }

  /// Read back an object written by [`Archive::put_json`]. Stages never read
  /// the archive; this serves operators and tests.
  pub async fn get_json<T: DeserializeOwned>(&self, container: Container, key: &str) -> Result<T> {
    let bytes = self
      .store(container)
      .get(&ObjectPath::from(key))
      .await?
      .bytes()
      .await?;
    Ok(serde_json::from_slice(&bytes)?)
  }
}

fn backup_key(prefix: &str, at: DateTime<Utc>) -> String {
  format!("{prefix}_{}.json", at.format("%Y%m%d_%H%M%S"))
}

async fn open_container(config: &ArchiveConfig, container: Container) -> Result<Arc<dyn ObjectStore>> {
  let bucket = config.bucket(container);
  match config.backend {
    Backend::Memory => Ok(Arc::new(InMemory::new())),
    Backend::Local => {
      let dir = config.root.join(bucket);
      tokio::fs::create_dir_all(&dir).await?;
      Ok(Arc::new(LocalFileSystem::new_with_prefix(dir)?))
    }
    Backend::S3 => {
      let endpoint = config.endpoint.as_deref().ok_or(Error::MissingSetting("endpoint"))?;
      let mut builder = AmazonS3Builder::new()
        .with_endpoint(endpoint)
        .with_bucket_name(bucket)
        .with_region(&config.region)
        .with_allow_http(config.allow_http);
      if let Some(key) = &config.access_key {
        builder = builder.with_access_key_id(key);
      }
      if let Some(secret) = &config.secret_key {
        builder = builder.with_secret_access_key(secret);
      }
      Ok(Arc::new(builder.build()?))
    }
  }
}
