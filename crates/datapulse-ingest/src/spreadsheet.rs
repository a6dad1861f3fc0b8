//! Partner-library workbook reader.
//!
//! The first worksheet's header row is matched by name, so column order in
//! the file does not matter. Headers are compared trimmed and lowercased; the
//! partner file uses French names, English names are accepted too.

use std::{collections::HashMap, path::Path};

use calamine::{Data, Reader as _, open_workbook_auto};
use chrono::{DateTime, NaiveTime, Utc};
use datapulse_core::{Warehouse, bronze::RawLibrary};

use crate::{
  Error, Result,
  bronze::{BronzeContext, land},
  fetch::PageSource,
};

const SOURCE: &str = "excel_partenaire";
pub const ARCHIVE_KEY: &str = "libraries/libraries_raw.json";

/// A worksheet as normalised text cells. Blank cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
  pub headers: Vec<String>,
  pub rows:    Vec<Vec<Option<String>>>,
}

// ─── Header mapping ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
  LibraryName,
  Address,
  PostalCode,
  City,
  ContactName,
  ContactEmail,
  ContactPhone,
  AnnualRevenue,
  PartnershipDate,
  Specialty,
}

const HEADERS: &[(Field, &[&str])] = &[
  (Field::LibraryName, &["nom_librairie", "library_name"]),
  (Field::Address, &["adresse", "address"]),
  (Field::PostalCode, &["code_postal", "postal_code"]),
  (Field::City, &["ville", "city"]),
  (Field::ContactName, &["contact_nom", "contact_name"]),
  (Field::ContactEmail, &["contact_email"]),
  (Field::ContactPhone, &["contact_telephone", "contact_phone"]),
  (Field::AnnualRevenue, &["ca_annuel", "annual_revenue"]),
  (Field::PartnershipDate, &["date_partenariat", "partnership_date"]),
  (Field::Specialty, &["specialite", "specialty"]),
];

fn column_map(headers: &[String]) -> Result<HashMap<Field, usize>> {
  let mut map = HashMap::new();
  for (index, header) in headers.iter().enumerate() {
    let header = header.trim().to_lowercase();
    if let Some((field, _)) = HEADERS.iter().find(|(_, names)| names.contains(&header.as_str())) {
      map.entry(*field).or_insert(index);
    }
  }

  for (field, name) in [(Field::LibraryName, "nom_librairie"), (Field::Address, "adresse")] {
    if !map.contains_key(&field) {
      return Err(Error::MissingHeader(name));
    }
  }
  Ok(map)
}

/// Map sheet rows onto raw library records. Fully blank rows are dropped.
pub fn libraries_from_sheet(sheet: &Sheet, ingested_at: DateTime<Utc>) -> Result<Vec<RawLibrary>> {
  let columns = column_map(&sheet.headers)?;

  let libraries = sheet
    .rows
    .iter()
    .filter(|row| row.iter().any(Option::is_some))
    .map(|row| {
      let cell = |field: Field| -> Option<String> {
        columns
          .get(&field)
          .and_then(|&i| row.get(i))
          .cloned()
          .flatten()
      };
      RawLibrary {
        library_name: cell(Field::LibraryName),
        address: cell(Field::Address),
        postal_code: cell(Field::PostalCode),
        city: cell(Field::City),
        contact_name: cell(Field::ContactName),
        contact_email: cell(Field::ContactEmail),
        contact_phone: cell(Field::ContactPhone),
        annual_revenue: cell(Field::AnnualRevenue).and_then(|v| parse_amount(&v)),
        partnership_date: cell(Field::PartnershipDate),
        specialty: cell(Field::Specialty),
        source: Some(SOURCE.into()),
        ingested_at,
      }
    })
    .collect();

  Ok(libraries)
}

fn parse_amount(text: &str) -> Option<f64> {
  let cleaned: String = text
    .chars()
    .filter(|c| !c.is_whitespace() && *c != '€')
    .map(|c| if c == ',' { '.' } else { c })
    .collect();
  cleaned.parse().ok()
}

// ─── Workbook ────────────────────────────────────────────────────────────────

pub fn read_sheet(path: &Path) -> Result<Sheet> {
  if !path.exists() {
    return Err(Error::MissingFile(path.to_path_buf()));
  }

  let mut workbook = open_workbook_auto(path)?;
  let range = workbook
    .worksheet_range_at(0)
    .ok_or_else(|| Error::EmptyWorkbook(path.to_path_buf()))??;

  let mut rows = range.rows();
  let headers = rows
    .next()
    .ok_or_else(|| Error::EmptyWorkbook(path.to_path_buf()))?
    .iter()
    .map(|c| cell_text(c).unwrap_or_default())
    .collect();
  let rows = rows.map(|r| r.iter().map(cell_text).collect()).collect();

  Ok(Sheet { headers, rows })
}

/// Render a cell the way it reads in the spreadsheet: whole floats lose their
/// fractional part (postal codes are stored as numbers), dates at midnight
/// lose their time.
fn cell_text(cell: &Data) -> Option<String> {
  match cell {
    Data::Empty | Data::Error(_) => None,
    Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
      let s = s.trim();
      (!s.is_empty()).then(|| s.to_owned())
    }
    Data::Int(i) => Some(i.to_string()),
    Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some((*f as i64).to_string()),
    Data::Float(f) => Some(f.to_string()),
    Data::Bool(b) => Some(b.to_string()),
    Data::DateTime(dt) => dt.as_datetime().map(|dt| {
      if dt.time() == NaiveTime::MIN {
        dt.date().format("%Y-%m-%d").to_string()
      } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
      }
    }),
  }
}

pub async fn run<W: Warehouse, S: PageSource>(ctx: &BronzeContext<'_, W, S>) -> Result<usize> {
  let path = &ctx.sources.libraries.path;
  let sheet = read_sheet(path)?;
  let libraries = libraries_from_sheet(&sheet, Utc::now())?;
  tracing::info!(path = %path.display(), rows = libraries.len(), "read partner workbook");
  land(ctx, libraries, ARCHIVE_KEY).await
}
