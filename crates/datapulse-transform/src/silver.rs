//! Bronze → silver: cleaning, deduplication, pseudonymization and geo
//! enrichment.
//!
//! The cleaning functions are pure and operate on whole tables in storage
//! order; [`run`] wires them to the warehouse following [`SILVER_PLAN`].

use std::{
  collections::{HashMap, HashSet},
  hash::Hash,
};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use datapulse_core::{
  Record, TableRef, Warehouse,
  bronze::{RawBook, RawGeocode, RawLibrary, RawProduct, RawQuote},
  silver::{Book, GeoLibrary, Library, Product, Quote},
};
use tracing::info;

use crate::{
  Error, Result,
  plan::{SILVER_PLAN, SilverStep},
  pseudonym::pseudonymize,
};

const UNKNOWN_CATEGORY: &str = "Unknown";

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Keep the first item for each key, preserving order.
fn dedup_by_key<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
  K: Eq + Hash,
  F: FnMut(&T) -> K,
{
  let mut seen = HashSet::new();
  items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

fn trimmed(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

/// Parse a displayed price. Currency symbols (and the `Â` left over from a
/// mis-decoded `£`) are stripped; the result must be finite and non-negative.
pub fn parse_price(text: &str) -> Option<f64> {
  let cleaned: String = text
    .chars()
    .filter(|c| !matches!(c, '£' | '$' | '€' | 'Â'))
    .collect();
  cleaned
    .trim()
    .parse::<f64>()
    .ok()
    .filter(|p| p.is_finite() && *p >= 0.0)
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// RFC 3339 and `DD/MM/YYYY`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
  let text = text.trim();
  NaiveDate::parse_from_str(text, "%Y-%m-%d")
    .ok()
    .or_else(|| {
      NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|dt| dt.date())
    })
    .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
    .or_else(|| NaiveDate::parse_from_str(text, "%d/%m/%Y").ok())
}

// ─── Cleaning ────────────────────────────────────────────────────────────────

/// Drop rows without a title or a usable price, trim titles, then keep the
/// first row per title.
pub fn clean_books(raw: Vec<RawBook>) -> Vec<Book> {
  let books = raw.into_iter().filter_map(|b| {
    let title = trimmed(b.title)?;
    let price = parse_price(b.price.as_deref()?)?;
    Some(Book {
      title,
      price,
      rating: b.rating,
      category: trimmed(b.category).unwrap_or_else(|| UNKNOWN_CATEGORY.to_owned()),
      source: b.source,
    })
  });
  dedup_by_key(books, |b| b.title.clone())
}

/// Keep the first row per quote text; trim author names.
pub fn clean_quotes(raw: Vec<RawQuote>) -> Vec<Quote> {
  let quotes = raw.into_iter().map(|q| Quote {
    quote:  q.quote,
    author: trimmed(q.author),
    tags:   q.tags,
  });
  dedup_by_key(quotes, |q| q.quote.clone())
}

/// Contact email and phone never leave this function. The contact name is
/// replaced by its pseudonym.
pub fn clean_libraries(raw: Vec<RawLibrary>) -> Vec<Library> {
  raw
    .into_iter()
    .map(|l| Library {
      library_name:     l.library_name,
      address:          l.address,
      postal_code:      l.postal_code,
      city:             l.city,
      contact_id:       trimmed(l.contact_name).map(|name| pseudonymize(&name)),
      annual_revenue:   l.annual_revenue,
      partnership_date: l.partnership_date.as_deref().and_then(parse_date),
      specialty:        l.specialty,
      source:           l.source,
    })
    .collect()
}

/// Left join on exact address. One output row per library; when an address
/// was geocoded several times the latest ingestion wins.
pub fn enrich_geo(libraries: Vec<Library>, geocodes: &[RawGeocode]) -> Vec<GeoLibrary> {
  let mut latest: HashMap<&str, &RawGeocode> = HashMap::new();
  for geo in geocodes {
    latest
      .entry(geo.address.as_str())
      .and_modify(|current| {
        if geo.ingested_at >= current.ingested_at {
          *current = geo;
        }
      })
      .or_insert(geo);
  }

  libraries
    .into_iter()
    .map(|library| {
      let geo = library
        .address
        .as_deref()
        .and_then(|address| latest.get(address).copied());
      GeoLibrary {
        geo_city: geo.and_then(|g| g.city.clone()),
        geo_postal_code: geo.and_then(|g| g.postal_code.clone()),
        latitude: geo.and_then(|g| g.latitude),
        longitude: geo.and_then(|g| g.longitude),
        library,
      }
    })
    .collect()
}

/// Drop rows without a name or a finite price, trim names, lower-case
/// categories, then keep the first row per (name, category, price).
pub fn clean_products(raw: Vec<RawProduct>) -> Vec<Product> {
  let products = raw.into_iter().filter_map(|p| {
    let price = p.price.filter(|p| p.is_finite())?;
    Some(Product {
      product_name: trimmed(p.product_name)?,
      category: trimmed(p.category).map(|c| c.to_lowercase()),
      price,
      description: p.description,
      source: p.source,
    })
  });
  dedup_by_key(products, |p| {
    (p.product_name.clone(), p.category.clone(), p.price.to_bits())
  })
}

// ─── Stage ───────────────────────────────────────────────────────────────────

/// Read a whole upstream table; a missing one aborts the stage.
async fn read_required<R: Record, W: Warehouse>(warehouse: &W) -> Result<Vec<R>> {
  if !warehouse.table_exists(R::TABLE).await.map_err(Error::warehouse)? {
    return Err(Error::MissingTable(R::TABLE));
  }
  warehouse.read().await.map_err(Error::warehouse)
}

async fn write<R: Record, W: Warehouse>(warehouse: &W, rows: Vec<R>) -> Result<usize> {
  let table: TableRef = R::TABLE;
  let written = warehouse.replace(rows).await.map_err(Error::warehouse)?;
  info!(%table, rows = written, "silver table written");
  Ok(written)
}

async fn run_step<W: Warehouse>(warehouse: &W, step: SilverStep) -> Result<usize> {
  match step {
    SilverStep::Books => {
      let raw: Vec<RawBook> = read_required(warehouse).await?;
      write(warehouse, clean_books(raw)).await
    }
    SilverStep::Quotes => {
      let raw: Vec<RawQuote> = read_required(warehouse).await?;
      write(warehouse, clean_quotes(raw)).await
    }
    SilverStep::Libraries => {
      let raw: Vec<RawLibrary> = read_required(warehouse).await?;
      write(warehouse, clean_libraries(raw)).await
    }
    SilverStep::GeoEnrichment => {
      let libraries: Vec<Library> = read_required(warehouse).await?;
      let geocodes: Vec<RawGeocode> = read_required(warehouse).await?;
      write(warehouse, enrich_geo(libraries, &geocodes)).await
    }
    SilverStep::Products => {
      let raw: Vec<RawProduct> = read_required(warehouse).await?;
      write(warehouse, clean_products(raw)).await
    }
  }
}

/// Run every silver step in plan order. Rerunning on unchanged bronze data
/// rebuilds identical tables.
pub async fn run<W: Warehouse>(warehouse: &W) -> Result<()> {
  SILVER_PLAN.validate()?;
  info!("START bronze → silver");
  warehouse.ensure_layers().await.map_err(Error::warehouse)?;

  for step in SILVER_PLAN.steps {
    let rows = run_step(warehouse, step.kind).await?;
    info!(step = %step.kind, rows, "step finished");
  }

  info!("END bronze → silver");
  Ok(())
}
