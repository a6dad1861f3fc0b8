//! Silver → gold: star-schema dimensions and synthetic fact tables.
//!
//! Dimensions take the distinct attribute tuples of a silver table in storage
//! order and number them from 1. Facts are a capped cross join of the
//! dimensions; they are demonstration data, not derived from transactions.

use std::{collections::HashSet, hash::Hash};

use chrono::NaiveDate;
use datapulse_archive::{Archive, Container};
use datapulse_core::{
  Record, Warehouse,
  gold::{DimAuthor, DimBook, DimGeo, DimProduct, FactSalesBook, FactSalesProduct},
  silver::{Book, GeoLibrary, Product, Quote},
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
  Error, Result,
  plan::{GOLD_PLAN, GoldStep},
  summary::Summary,
};

/// Upper bound on `fact_sales_books` rows.
pub const BOOK_FACT_CAP: usize = 100;
pub const BOOK_QUANTITY: i64 = 1;
pub const PRODUCT_QUANTITY: i64 = 2;

// ─── Dimensions ──────────────────────────────────────────────────────────────

/// Distinct keys in first-occurrence order.
fn distinct<K: Eq + Hash + Clone>(keys: impl IntoIterator<Item = K>) -> Vec<K> {
  let mut seen = HashSet::new();
  keys
    .into_iter()
    .filter(|k| seen.insert(k.clone()))
    .collect()
}

fn surrogate_key(index: usize) -> i64 {
  index as i64 + 1
}

pub fn dim_books(books: &[Book]) -> Vec<DimBook> {
  let tuples = distinct(
    books
      .iter()
      .map(|b| (b.title.clone(), b.category.clone(), b.price.to_bits())),
  );
  tuples
    .into_iter()
    .enumerate()
    .map(|(i, (title, category, price))| DimBook {
      book_key: surrogate_key(i),
      title,
      category,
      price: f64::from_bits(price),
    })
    .collect()
}

pub fn dim_authors(quotes: &[Quote]) -> Vec<DimAuthor> {
  distinct(quotes.iter().filter_map(|q| q.author.clone()))
    .into_iter()
    .enumerate()
    .map(|(i, author_name)| DimAuthor { author_key: surrogate_key(i), author_name })
    .collect()
}

/// Locations from the enriched libraries; the geocoded city and postal code
/// win over the library's own. Rows with no city at all are left out.
pub fn dim_geo(libraries: &[GeoLibrary]) -> Vec<DimGeo> {
  let tuples = distinct(libraries.iter().filter_map(|l| {
    let city = l.best_city()?.to_owned();
    Some((city, l.best_postal_code().map(str::to_owned)))
  }));
  tuples
    .into_iter()
    .enumerate()
    .map(|(i, (city, postal_code))| DimGeo { geo_key: surrogate_key(i), city, postal_code })
    .collect()
}

pub fn dim_products(products: &[Product]) -> Vec<DimProduct> {
  let tuples = distinct(products.iter().map(|p| {
    (p.product_name.clone(), p.category.clone(), p.price.to_bits())
  }));
  tuples
    .into_iter()
    .enumerate()
    .map(|(i, (product_name, category, price))| DimProduct {
      product_key: surrogate_key(i),
      product_name,
      category,
      price: f64::from_bits(price),
    })
    .collect()
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// books × authors × geo, books outermost, truncated to [`BOOK_FACT_CAP`].
/// With no geo rows the join is books × authors with a null geo key.
pub fn fact_sales_books(
  books: &[DimBook],
  authors: &[DimAuthor],
  geo: &[DimGeo],
  sales_date: NaiveDate,
) -> Vec<FactSalesBook> {
  let geo_keys: Vec<Option<i64>> = if geo.is_empty() {
    vec![None]
  } else {
    geo.iter().map(|g| Some(g.geo_key)).collect()
  };
  let geo_keys = &geo_keys;

  books
    .iter()
    .flat_map(|book| {
      authors.iter().flat_map(move |author| {
        geo_keys.iter().map(move |&geo_key| FactSalesBook {
          book_key: book.book_key,
          author_key: author.author_key,
          geo_key,
          sales_date,
          quantity: BOOK_QUANTITY,
          price: book.price,
          sales_amount: BOOK_QUANTITY as f64 * book.price,
        })
      })
    })
    .take(BOOK_FACT_CAP)
    .collect()
}

pub fn fact_sales_products(products: &[DimProduct], sales_date: NaiveDate) -> Vec<FactSalesProduct> {
  products
    .iter()
    .map(|p| FactSalesProduct {
      product_key: p.product_key,
      sales_date,
      quantity: PRODUCT_QUANTITY,
      price: p.price,
      sales_amount: PRODUCT_QUANTITY as f64 * p.price,
    })
    .collect()
}

// ─── Stage ───────────────────────────────────────────────────────────────────

/// Inputs for one gold build.
pub struct BuildContext<'a, W> {
  pub warehouse:  &'a W,
  /// Where written tables are exported as JSON; `None` disables exports.
  pub archive:    Option<&'a Archive>,
  pub sales_date: NaiveDate,
}

/// What a build did, per step.
#[derive(Debug, Default)]
pub struct GoldReport {
  pub written: Vec<(GoldStep, usize)>,
  pub skipped: Vec<GoldStep>,
  pub summary: Option<Summary>,
}

impl<W: Warehouse> BuildContext<'_, W> {
  async fn exists<R: Record>(&self) -> Result<bool> {
    self.warehouse.table_exists(R::TABLE).await.map_err(Error::warehouse)
  }

  async fn read_required<R: Record>(&self) -> Result<Vec<R>> {
    if !self.exists::<R>().await? {
      return Err(Error::MissingTable(R::TABLE));
    }
    self.warehouse.read().await.map_err(Error::warehouse)
  }

  /// Read a table that may legitimately be absent; absent reads as empty.
  async fn read_optional<R: Record>(&self) -> Result<Vec<R>> {
    if !self.exists::<R>().await? {
      return Ok(Vec::new());
    }
    self.warehouse.read().await.map_err(Error::warehouse)
  }

  /// Replace `R::TABLE` with `rows` and export them. Empty input leaves the
  /// previous table in place and returns `None`.
  async fn publish<R: Record + Serialize + Sync>(&self, rows: Vec<R>) -> Result<Option<usize>> {
    if rows.is_empty() {
      warn!(table = %R::TABLE, "no source rows, keeping previous table");
      return Ok(None);
    }

    if let Some(archive) = self.archive {
      let key = format!("gold/{}.json", R::TABLE.name);
      if let Err(e) = archive.put_json(Container::Exports, &key, &rows).await {
        warn!(key, error = %e, "gold export failed");
      }
    }

    let written = self.warehouse.replace(rows).await.map_err(Error::warehouse)?;
    info!(table = %R::TABLE, rows = written, "gold table written");
    Ok(Some(written))
  }

  async fn run_step(&self, step: GoldStep) -> Result<Option<usize>> {
    match step {
      GoldStep::DimBooks => {
        let books: Vec<Book> = self.read_required().await?;
        self.publish(dim_books(&books)).await
      }
      GoldStep::DimAuthors => {
        let quotes: Vec<Quote> = self.read_required().await?;
        self.publish(dim_authors(&quotes)).await
      }
      GoldStep::DimGeo => {
        if !self.exists::<GeoLibrary>().await? {
          warn!(table = %GeoLibrary::TABLE, "source table missing, skipping geo dimension");
          return Ok(None);
        }
        let libraries: Vec<GeoLibrary> = self.read_required().await?;
        self.publish(dim_geo(&libraries)).await
      }
      GoldStep::DimProducts => {
        let products: Vec<Product> = self.read_required().await?;
        self.publish(dim_products(&products)).await
      }
      GoldStep::FactSalesBooks => {
        let books: Vec<DimBook> = self.read_optional().await?;
        let authors: Vec<DimAuthor> = self.read_optional().await?;
        if books.is_empty() || authors.is_empty() {
          warn!("book or author dimension missing or empty, skipping book facts");
          return Ok(None);
        }
        let geo: Vec<DimGeo> = match self.read_optional().await {
          Ok(geo) => geo,
          Err(e) => {
            warn!(error = %e, "geo dimension unreadable, facts get no geo key");
            Vec::new()
          }
        };
        self
          .publish(fact_sales_books(&books, &authors, &geo, self.sales_date))
          .await
      }
      GoldStep::FactSalesProducts => {
        let products: Vec<DimProduct> = self.read_optional().await?;
        if products.is_empty() {
          warn!("product dimension missing or empty, skipping product facts");
          return Ok(None);
        }
        self
          .publish(fact_sales_products(&products, self.sales_date))
          .await
      }
    }
  }
}

/// Run every gold step in plan order, then compute and log the summary. With
/// an archive, the summary is exported and a timestamped backup is kept.
pub async fn run<W: Warehouse>(ctx: &BuildContext<'_, W>) -> Result<GoldReport> {
  GOLD_PLAN.validate()?;
  info!(sales_date = %ctx.sales_date, "START silver → gold");
  ctx.warehouse.ensure_layers().await.map_err(Error::warehouse)?;

  let mut report = GoldReport::default();
  for step in GOLD_PLAN.steps {
    match ctx.run_step(step.kind).await? {
      Some(rows) => report.written.push((step.kind, rows)),
      None => report.skipped.push(step.kind),
    }
  }

  let summary = Summary::compute(
    &ctx.read_optional::<DimBook>().await?,
    &ctx.read_optional::<FactSalesBook>().await?,
    &ctx.read_optional::<DimProduct>().await?,
    &ctx.read_optional::<FactSalesProduct>().await?,
  );
  summary.log();
  if let Some(archive) = ctx.archive {
    if let Err(e) = archive
      .put_json(Container::Exports, "gold/summary.json", &summary)
      .await
    {
      warn!(error = %e, "summary export failed");
    }
    match archive.backup_json("summary", &summary).await {
      Ok(key) => info!(%key, "summary backed up"),
      Err(e) => warn!(error = %e, "summary backup failed"),
    }
  }
  report.summary = Some(summary);

  info!(written = report.written.len(), skipped = report.skipped.len(), "END silver → gold");
  Ok(report)
}
