//! Bronze tier — raw rows exactly as the sources produced them.
//!
//! Fields are unvalidated and nullable. Rows are append-only: a re-ingestion
//! adds new rows with a newer `ingested_at` instead of touching old ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  table::{Column, ColumnType::*, Layer, Record, Row, TableRef, Value},
};

// ─── Books ───────────────────────────────────────────────────────────────────

/// One product card from the book catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBook {
  pub title:       Option<String>,
  /// Price text as displayed, currency symbol included (e.g. `£51.77`).
  pub price:       Option<String>,
  /// Star rating word (e.g. `Three`).
  pub rating:      Option<String>,
  pub category:    Option<String>,
  pub source:      Option<String>,
  pub ingested_at: DateTime<Utc>,
}

impl Record for RawBook {
  const TABLE: TableRef = TableRef::new(Layer::Bronze, "books_raw");
  const COLUMNS: &'static [Column] = &[
    Column::new("title", Text),
    Column::new("price", Text),
    Column::new("rating", Text),
    Column::new("category", Text),
    Column::new("source", Text),
    Column::new("ingested_at", Timestamp),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.title.clone().into(),
      self.price.clone().into(),
      self.rating.clone().into(),
      self.category.clone().into(),
      self.source.clone().into(),
      self.ingested_at.into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      title:       row.opt_text(0)?,
      price:       row.opt_text(1)?,
      rating:      row.opt_text(2)?,
      category:    row.opt_text(3)?,
      source:      row.opt_text(4)?,
      ingested_at: row.timestamp(5)?,
    })
  }
}

// ─── Quotes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
  pub quote:       Option<String>,
  pub author:      Option<String>,
  /// Tags joined with `,`.
  pub tags:        Option<String>,
  pub ingested_at: DateTime<Utc>,
}

impl Record for RawQuote {
  const TABLE: TableRef = TableRef::new(Layer::Bronze, "quotes_raw");
  const COLUMNS: &'static [Column] = &[
    Column::new("quote", Text),
    Column::new("author", Text),
    Column::new("tags", Text),
    Column::new("ingested_at", Timestamp),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.quote.clone().into(),
      self.author.clone().into(),
      self.tags.clone().into(),
      self.ingested_at.into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      quote:       row.opt_text(0)?,
      author:      row.opt_text(1)?,
      tags:        row.opt_text(2)?,
      ingested_at: row.timestamp(3)?,
    })
  }
}

// ─── E-commerce ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
  pub product_name: Option<String>,
  pub price:        Option<f64>,
  pub description:  Option<String>,
  pub category:     Option<String>,
  pub source:       Option<String>,
  pub ingested_at:  DateTime<Utc>,
}

impl Record for RawProduct {
  const TABLE: TableRef = TableRef::new(Layer::Bronze, "ecommerce_raw");
  const COLUMNS: &'static [Column] = &[
    Column::new("product_name", Text),
    Column::new("price", Real),
    Column::new("description", Text),
    Column::new("category", Text),
    Column::new("source", Text),
    Column::new("ingested_at", Timestamp),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.product_name.clone().into(),
      self.price.into(),
      self.description.clone().into(),
      self.category.clone().into(),
      self.source.clone().into(),
      self.ingested_at.into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      product_name: row.opt_text(0)?,
      price:        row.opt_real(1)?,
      description:  row.opt_text(2)?,
      category:     row.opt_text(3)?,
      source:       row.opt_text(4)?,
      ingested_at:  row.timestamp(5)?,
    })
  }
}

// ─── Geocoding ───────────────────────────────────────────────────────────────

/// The first candidate the geocoding API returned for `address`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGeocode {
  /// The query string, verbatim. Silver joins on it.
  pub address:     String,
  pub city:        Option<String>,
  pub postal_code: Option<String>,
  pub latitude:    Option<f64>,
  pub longitude:   Option<f64>,
  pub ingested_at: DateTime<Utc>,
}

impl Record for RawGeocode {
  const TABLE: TableRef = TableRef::new(Layer::Bronze, "geocoding_raw");
  const COLUMNS: &'static [Column] = &[
    Column::new("address", Text),
    Column::new("city", Text),
    Column::new("postal_code", Text),
    Column::new("latitude", Real),
    Column::new("longitude", Real),
    Column::new("ingested_at", Timestamp),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.address.clone().into(),
      self.city.clone().into(),
      self.postal_code.clone().into(),
      self.latitude.into(),
      self.longitude.into(),
      self.ingested_at.into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      address:     row.text(0)?,
      city:        row.opt_text(1)?,
      postal_code: row.opt_text(2)?,
      latitude:    row.opt_real(3)?,
      longitude:   row.opt_real(4)?,
      ingested_at: row.timestamp(5)?,
    })
  }
}

// ─── Partner libraries ───────────────────────────────────────────────────────

/// One row of the partner-library spreadsheet.
///
/// Carries personal data (`contact_*`). It must never leave the bronze tier;
/// the silver library types have no field to hold it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLibrary {
  pub library_name:     Option<String>,
  pub address:          Option<String>,
  pub postal_code:      Option<String>,
  pub city:             Option<String>,
  pub contact_name:     Option<String>,
  pub contact_email:    Option<String>,
  pub contact_phone:    Option<String>,
  pub annual_revenue:   Option<f64>,
  /// Kept as text; silver coerces it to a date.
  pub partnership_date: Option<String>,
  pub specialty:        Option<String>,
  pub source:           Option<String>,
  pub ingested_at:      DateTime<Utc>,
}

impl Record for RawLibrary {
  const TABLE: TableRef = TableRef::new(Layer::Bronze, "libraries_raw");
  const COLUMNS: &'static [Column] = &[
    Column::new("library_name", Text),
    Column::new("address", Text),
    Column::new("postal_code", Text),
    Column::new("city", Text),
    Column::new("contact_name", Text),
    Column::new("contact_email", Text),
    Column::new("contact_phone", Text),
    Column::new("annual_revenue", Real),
    Column::new("partnership_date", Text),
    Column::new("specialty", Text),
    Column::new("source", Text),
    Column::new("ingested_at", Timestamp),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.library_name.clone().into(),
      self.address.clone().into(),
      self.postal_code.clone().into(),
      self.city.clone().into(),
      self.contact_name.clone().into(),
      self.contact_email.clone().into(),
      self.contact_phone.clone().into(),
      self.annual_revenue.into(),
      self.partnership_date.clone().into(),
      self.specialty.clone().into(),
      self.source.clone().into(),
      self.ingested_at.into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      library_name:     row.opt_text(0)?,
      address:          row.opt_text(1)?,
      postal_code:      row.opt_text(2)?,
      city:             row.opt_text(3)?,
      contact_name:     row.opt_text(4)?,
      contact_email:    row.opt_text(5)?,
      contact_phone:    row.opt_text(6)?,
      annual_revenue:   row.opt_real(7)?,
      partnership_date: row.opt_text(8)?,
      specialty:        row.opt_text(9)?,
      source:           row.opt_text(10)?,
      ingested_at:      row.timestamp(11)?,
    })
  }
}
