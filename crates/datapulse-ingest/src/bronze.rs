//! The bronze stage: run every connector, land raw rows, mirror payloads.

use datapulse_archive::{Archive, Container};
use datapulse_core::{Record, Warehouse};
use serde::Serialize;
use strum::IntoEnumIterator as _;
use tracing::{error, info, warn};

use crate::{
  Error, Result, books, config::SourcesConfig, fetch::PageSource, geocode, products, quotes,
  spreadsheet,
};

/// Everything a connector needs, borrowed from the driver for one stage run.
pub struct BronzeContext<'a, W, S> {
  pub warehouse: &'a W,
  pub source:    &'a S,
  pub archive:   &'a Archive,
  pub sources:   &'a SourcesConfig,
}

/// Connectors in run order. Libraries land before geocoding so their
/// addresses can be looked up in the same run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Connector {
  Books,
  Quotes,
  Libraries,
  Products,
  Geocoding,
}

impl Connector {
  pub async fn run<W: Warehouse, S: PageSource>(self, ctx: &BronzeContext<'_, W, S>) -> Result<usize> {
    match self {
      Connector::Books => books::run(ctx).await,
      Connector::Quotes => quotes::run(ctx).await,
      Connector::Libraries => spreadsheet::run(ctx).await,
      Connector::Products => products::run(ctx).await,
      Connector::Geocoding => geocode::run(ctx).await,
    }
  }
}

#[derive(Debug, Default)]
pub struct BronzeReport {
  pub landed: Vec<(Connector, usize)>,
  pub failed: Vec<(Connector, String)>,
}

/// Mirror `rows` to the raw archive under `key`, then append them to their
/// bronze table. The table is created even for an empty batch. A failed
/// mirror only warns; the table is the record.
pub(crate) async fn land<R, W, S>(ctx: &BronzeContext<'_, W, S>, rows: Vec<R>, key: &str) -> Result<usize>
where
  R: Record + Serialize + Sync,
  W: Warehouse,
  S: PageSource,
{
  if let Err(e) = ctx.archive.put_json(Container::Raw, key, &rows).await {
    warn!(key, error = %e, "raw archive mirror failed");
  }

  let written = ctx.warehouse.append(rows).await.map_err(Error::warehouse)?;
  info!(table = %R::TABLE, rows = written, "landed raw rows");
  Ok(written)
}

/// Run every connector in order. A failing connector is logged and the rest
/// still run; the stage fails afterwards if any of them did.
pub async fn run<W: Warehouse, S: PageSource>(ctx: &BronzeContext<'_, W, S>) -> Result<BronzeReport> {
  info!("START bronze ingestion");
  ctx.warehouse.ensure_layers().await.map_err(Error::warehouse)?;

  let mut report = BronzeReport::default();
  for connector in Connector::iter() {
    match connector.run(ctx).await {
      Ok(rows) => {
        info!(%connector, rows, "connector finished");
        report.landed.push((connector, rows));
      }
      Err(e) => {
        error!(%connector, error = %e, "connector failed");
        report.failed.push((connector, e.to_string()));
      }
    }
  }

  if !report.failed.is_empty() {
    let names = report.failed.iter().map(|(c, _)| c.to_string()).collect();
    return Err(Error::ConnectorsFailed(names));
  }

  info!(connectors = report.landed.len(), "END bronze ingestion");
  Ok(report)
}
