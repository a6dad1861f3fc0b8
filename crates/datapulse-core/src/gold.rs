//! Gold tier — star-schema dimensions and synthetic fact tables.
//!
//! Surrogate keys (`*_key`) are 1-based positions assigned at build time and
//! are only stable within one build.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  table::{Column, ColumnType::*, Layer, Record, Row, TableRef, Value},
};

// ─── Dimensions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimBook {
  pub book_key: i64,
  pub title:    String,
  pub category: String,
  pub price:    f64,
}

impl Record for DimBook {
  const TABLE: TableRef = TableRef::new(Layer::Gold, "dim_books");
  const COLUMNS: &'static [Column] = &[
    Column::new("book_key", Integer),
    Column::new("title", Text),
    Column::new("category", Text),
    Column::new("price", Real),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.book_key.into(),
      self.title.clone().into(),
      self.category.clone().into(),
      self.price.into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      book_key: row.integer(0)?,
      title:    row.text(1)?,
      category: row.text(2)?,
      price:    row.real(3)?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimAuthor {
  pub author_key:  i64,
  pub author_name: String,
}

impl Record for DimAuthor {
  const TABLE: TableRef = TableRef::new(Layer::Gold, "dim_authors");
  const COLUMNS: &'static [Column] = &[
    Column::new("author_key", Integer),
    Column::new("author_name", Text),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![self.author_key.into(), self.author_name.clone().into()]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      author_key:  row.integer(0)?,
      author_name: row.text(1)?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimGeo {
  pub geo_key:     i64,
  pub city:        String,
  pub postal_code: Option<String>,
}

impl Record for DimGeo {
  const TABLE: TableRef = TableRef::new(Layer::Gold, "dim_geo");
  const COLUMNS: &'static [Column] = &[
    Column::new("geo_key", Integer),
    Column::new("city", Text),
    Column::new("postal_code", Text),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.geo_key.into(),
      self.city.clone().into(),
      self.postal_code.clone().into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      geo_key:     row.integer(0)?,
      city:        row.text(1)?,
      postal_code: row.opt_text(2)?,
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimProduct {
  pub product_key:  i64,
  pub product_name: String,
  pub category:     Option<String>,
  pub price:        f64,
}

impl Record for DimProduct {
  const TABLE: TableRef = TableRef::new(Layer::Gold, "dim_products");
  const COLUMNS: &'static [Column] = &[
    Column::new("product_key", Integer),
    Column::new("product_name", Text),
    Column::new("category", Text),
    Column::new("price", Real),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.product_key.into(),
      self.product_name.clone().into(),
      self.category.clone().into(),
      self.price.into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      product_key:  row.integer(0)?,
      product_name: row.text(1)?,
      category:     row.opt_text(2)?,
      price:        row.real(3)?,
    })
  }
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// Synthetic book sale: one row per (book, author[, geo]) combination.
///
/// Not derived from any real transaction; see the gold builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactSalesBook {
  pub book_key:     i64,
  pub author_key:   i64,
  pub geo_key:      Option<i64>,
  pub sales_date:   NaiveDate,
  pub quantity:     i64,
  pub price:        f64,
  pub sales_amount: f64,
}

impl Record for FactSalesBook {
  const TABLE: TableRef = TableRef::new(Layer::Gold, "fact_sales_books");
  const COLUMNS: &'static [Column] = &[
    Column::new("book_key", Integer),
    Column::new("author_key", Integer),
    Column::new("geo_key", Integer),
    Column::new("sales_date", Date),
    Column::new("quantity", Integer),
    Column::new("price", Real),
    Column::new("sales_amount", Real),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.book_key.into(),
      self.author_key.into(),
      self.geo_key.into(),
      self.sales_date.into(),
      self.quantity.into(),
      self.price.into(),
      self.sales_amount.into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      book_key:     row.integer(0)?,
      author_key:   row.integer(1)?,
      geo_key:      row.opt_integer(2)?,
      sales_date:   row.date(3)?,
      quantity:     row.integer(4)?,
      price:        row.real(5)?,
      sales_amount: row.real(6)?,
    })
  }
}

/// Synthetic product sale: one row per product dimension row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactSalesProduct {
  pub product_key:  i64,
  pub sales_date:   NaiveDate,
  pub quantity:     i64,
  pub price:        f64,
  pub sales_amount: f64,
}

impl Record for FactSalesProduct {
  const TABLE: TableRef = TableRef::new(Layer::Gold, "fact_sales_products");
  const COLUMNS: &'static [Column] = &[
    Column::new("product_key", Integer),
    Column::new("sales_date", Date),
    Column::new("quantity", Integer),
    Column::new("price", Real),
    Column::new("sales_amount", Real),
  ];

  fn to_row(&self) -> Vec<Value> {
    vec![
      self.product_key.into(),
      self.sales_date.into(),
      self.quantity.into(),
      self.price.into(),
      self.sales_amount.into(),
    ]
  }

  fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      product_key:  row.integer(0)?,
      sales_date:   row.date(1)?,
      quantity:     row.integer(2)?,
      price:        row.real(3)?,
      sales_amount: row.real(4)?,
    })
  }
}
