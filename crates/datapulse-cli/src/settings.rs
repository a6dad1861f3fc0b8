//! Runtime settings: an optional TOML file layered under `DATAPULSE_*`
//! environment variables. Nested keys use `__`, e.g.
//! `DATAPULSE_WAREHOUSE__DIR=/var/lib/datapulse`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use datapulse_archive::ArchiveConfig;
use datapulse_ingest::{HttpConfig, SourcesConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarehouseSettings {
  /// Directory holding one SQLite file per layer.
  pub dir: PathBuf,
}

impl Default for WarehouseSettings {
  fn default() -> Self {
    Self { dir: PathBuf::from("data/warehouse") }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub warehouse: WarehouseSettings,
  pub archive:   ArchiveConfig,
  pub http:      HttpConfig,
  pub sources:   SourcesConfig,
}

impl Settings {
  /// Load from `path` (which need not exist) and the process environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::load_with_env(path, None)
  }

  /// Like [`Settings::load`], reading variables from `env` instead of the
  /// process environment when given.
  pub fn load_with_env(path: &Path, env: Option<config::Map<String, String>>) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("DATAPULSE")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true)
          .source(env),
      )
      .build()
      .with_context(|| format!("failed to read config from {}", path.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}
