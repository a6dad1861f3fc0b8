//! Silver tier — conformed rows, one table per entity.
//!
//! Every silver table is rewritten wholesale by each silver run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  table::{Column, ColumnType::*, Layer, Record, Row, TableRef, Value},
};

// ─── Books ───────────────────────────────────────────────────────────────────

/// Unique by trimmed `title`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
  pub title:    String,
  pub price:    f64,
  pub rating:   Option<String>,
  pub category: String,
  pub source:   Option<String>,
}

impl Record for Book {
  const TABLE: TableRef = TableRef::new(Layer::Silver, "books");
  const COLUMNS: &'static [Column] = &[
    Column::new("title", Text),
    Column::new("price", Real),
    Column::new("rating", Text),
    Column::new("category", Text),
    Column::new("source", Text),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.title.clone().into(),
      self.price.into(),
      self.rating.clone().into(),
      self.category.clone().into(),
      self.source.clone().into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      title:    row.text(0)?,
      price:    row.real(1)?,
      rating:   row.opt_text(2)?,
      category: row.text(3)?,
      source:   row.opt_text(4)?,
    })
  }
}

// ─── Quotes ──────────────────────────────────────────────────────────────────

/// Unique by exact `quote` text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
  pub quote:  Option<String>,
  pub author: Option<String>,
  pub tags:   Option<String>,
}

impl Record for Quote {
  const TABLE: TableRef = TableRef::new(Layer::Silver, "quotes");
  const COLUMNS: &'static [Column] = &[
    Column::new("quote", Text),
    Column::new("author", Text),
    Column::new("tags", Text),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.quote.clone().into(),
      self.author.clone().into(),
      self.tags.clone().into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      quote:  row.opt_text(0)?,
      author: row.opt_text(1)?,
      tags:   row.opt_text(2)?,
    })
  }
}

// ─── Libraries ───────────────────────────────────────────────────────────────

/// A partner library with personal data removed.
///
/// There is intentionally no email or phone field: PII cannot be persisted
/// past bronze because no silver type can hold it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
  pub library_name:     Option<String>,
  pub address:          Option<String>,
  pub postal_code:      Option<String>,
  pub city:             Option<String>,
  /// Pseudonymous stand-in for the contact's name (`user_<n>`).
  pub contact_id:       Option<String>,
  pub annual_revenue:   Option<f64>,
  pub partnership_date: Option<NaiveDate>,
  pub specialty:        Option<String>,
  pub source:           Option<String>,
}

const LIBRARY_COLUMNS: [Column; 9] = [
  Column::new("library_name", Text),
  Column::new("address", Text),
  Column::new("postal_code", Text),
  Column::new("city", Text),
  Column::new("contact_id", Text),
  Column::new("annual_revenue", Real),
  Column::new("partnership_date", Date),
  Column::new("specialty", Text),
  Column::new("source", Text),
];

impl Library {
  fn push_values(&self, out: &mut Vec<Value>) {
    let values: [Value; 9] = [
      self.library_name.clone().into(),
      self.address.clone().into(),
      self.postal_code.clone().into(),
      self.city.clone().into(),
      self.contact_id.clone().into(),
      self.annual_revenue.into(),
      self.partnership_date.into(),
      self.specialty.clone().into(),
      self.source.clone().into(),
    ];
    out.extend(values);
  }

  fn read(row: &Row) -> Result<Self> {
    Ok(Self {
      library_name:     row.opt_text(0)?,
      address:          row.opt_text(1)?,
      postal_code:      row.opt_text(2)?,
      city:             row.opt_text(3)?,
      contact_id:       row.opt_text(4)?,
      annual_revenue:   row.opt_real(5)?,
      partnership_date: row.opt_date(6)?,
      specialty:        row.opt_text(7)?,
      source:           row.opt_text(8)?,
    })
  }
}

impl Record for Library {
  const TABLE: TableRef = TableRef::new(Layer::Silver, "libraries_clean");
  const COLUMNS: &'static [Column] = &LIBRARY_COLUMNS;

  fn to_row(&self) -> Vec<Value> {
    let mut out = Vec::with_capacity(LIBRARY_COLUMNS.len());
    self.push_values(&mut out);
    out
  }

  fn from_row(row: &Row) -> Result<Self> { Self::read(row) }
}

/// A [`Library`] left-joined to its geocode. Unmatched rows keep `None` geo
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLibrary {
  #[serde(flatten)]
  pub library:         Library,
  pub geo_city:        Option<String>,
  pub geo_postal_code: Option<String>,
  pub latitude:        Option<f64>,
  pub longitude:       Option<f64>,
}

impl GeoLibrary {
  /// The geocoded city, falling back to the library's own.
  pub fn best_city(&self) -> Option<&str> {
    self.geo_city.as_deref().or(self.library.city.as_deref())
  }

  pub fn best_postal_code(&self) -> Option<&str> {
    self
      .geo_postal_code
      .as_deref()
      .or(self.library.postal_code.as_deref())
  }
}

impl Record for GeoLibrary {
  const TABLE: TableRef = TableRef::new(Layer::Silver, "libraries_geo");
  const COLUMNS: &'static [Column] = &[
    LIBRARY_COLUMNS[0],
    LIBRARY_COLUMNS[1],
    LIBRARY_COLUMNS[2],
    LIBRARY_COLUMNS[3],
    LIBRARY_COLUMNS[4],
    LIBRARY_COLUMNS[5],
    LIBRARY_COLUMNS[6],
    LIBRARY_COLUMNS[7],
    LIBRARY_COLUMNS[8],
    Column::new("geo_city", Text),
    Column::new("geo_postal_code", Text),
    Column::new("latitude", Real),
    Column::new("longitude", Real),
  ];

  fn to_row(&self) -> Vec<Value> {
    let mut out = Vec::with_capacity(Self::COLUMNS.len());
    self.library.push_values(&mut out);
    let geo: [Value; 4] = [
      self.geo_city.clone().into(),
      self.geo_postal_code.clone().into(),
      self.latitude.into(),
      self.longitude.into(),
    ];
    out.extend(geo);
    out
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      library:         Library::read(row)?,
      geo_city:        row.opt_text(9)?,
      geo_postal_code: row.opt_text(10)?,
      latitude:        row.opt_real(11)?,
      longitude:       row.opt_real(12)?,
    })
  }
}

// ─── Products ────────────────────────────────────────────────────────────────

/// Unique by `(product_name, category, price)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub product_name: String,
  pub category:     Option<String>,
  pub price:        f64,
  pub description:  Option<String>,
  pub source:       Option<String>,
}

impl Record for Product {
  const TABLE: TableRef = TableRef::new(Layer::Silver, "products_clean");
  const COLUMNS: &'static [Column] = &[
    Column::new("product_name", Text),
    Column::new("category", Text),
    Column::new("price", Real),
    Column::new("description", Text),
    Column::new("source", Text),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.product_name.clone().into(),
      self.category.clone().into(),
      self.price.into(),
      self.description.clone().into(),
      self.source.clone().into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      product_name: row.text(0)?,
      category:     row.opt_text(1)?,
      price:        row.real(2)?,
      description:  row.opt_text(3)?,
      source:       row.opt_text(4)?,
    })
  }
}
