//! Stage dispatch. The driver owns every client for the duration of one run
//! and hands stages borrowed references.

use anyhow::Context as _;
use chrono::Local;
use datapulse_archive::Archive;
use datapulse_core::Warehouse;
use datapulse_ingest::{BronzeContext, HttpSource, bronze};
use datapulse_store_sqlite::SqliteWarehouse;
use datapulse_transform::{
  gold::{self, BuildContext},
  silver,
};

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Step {
  /// Scrape every source into the bronze layer.
  Bronze,
  /// Clean bronze tables into conformed silver tables.
  Silver,
  /// Build the gold star schema from silver.
  Gold,
}

/// Open the warehouse, run `step`, and close the warehouse whatever the
/// outcome. A stage error takes precedence over a close error.
pub async fn run(step: Step, settings: &Settings) -> anyhow::Result<()> {
  let dir = &settings.warehouse.dir;
  let warehouse = SqliteWarehouse::open(dir)
    .await
    .with_context(|| format!("failed to open warehouse at {}", dir.display()))?;

  let outcome = run_stage(step, settings, &warehouse).await;
  let closed = warehouse.close().await.context("failed to close warehouse");

  outcome?;
  closed
}

async fn run_stage<W: Warehouse>(step: Step, settings: &Settings, warehouse: &W) -> anyhow::Result<()> {
  match step {
    Step::Bronze => {
      let archive = open_archive(settings).await?;
      let source = HttpSource::new(&settings.http).context("failed to build HTTP client")?;
      let ctx = BronzeContext {
        warehouse,
        source: &source,
        archive: &archive,
        sources: &settings.sources,
      };
      bronze::run(&ctx).await.context("bronze stage failed")?;
    }
    Step::Silver => {
      silver::run(warehouse).await.context("silver stage failed")?;
    }
    Step::Gold => {
      let archive = open_archive(settings).await?;
      let ctx = BuildContext {
        warehouse,
        archive: Some(&archive),
        sales_date: Local::now().date_naive(),
      };
      gold::run(&ctx).await.context("gold stage failed")?;
    }
  }
  Ok(())
}

async fn open_archive(settings: &Settings) -> anyhow::Result<Archive> {
  Archive::open(&settings.archive)
    .await
    .context("failed to open archive")
}
