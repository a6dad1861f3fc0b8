//! SQL generation for the DataPulse SQLite warehouse.
//!
//! Table DDL is derived from a record's column list, so a table always has
//! exactly the shape its Rust row type declares. Identifiers are quoted; the
//! names come from `'static` column lists, never from user input.

use datapulse_core::{Column, Layer, TableRef};

use crate::encode::sql_type;

/// Applied to the main database and every attached layer of an on-disk
/// warehouse.
pub const FILE_PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous  = NORMAL;
";

/// File name of a layer's database inside the warehouse directory.
pub fn layer_file(layer: Layer) -> String { format!("{layer}.db") }

/// `ATTACH` statement for `layer`; the database path is bound as `?1`.
pub fn attach(layer: Layer) -> String {
  format!("ATTACH DATABASE ?1 AS \"{layer}\"")
}

pub fn journal_mode(layer: Layer) -> String {
  format!("PRAGMA \"{layer}\".journal_mode = WAL")
}

fn qualified(table: TableRef) -> String {
  format!("\"{}\".\"{}\"", table.layer, table.name)
}

pub fn create_table(table: TableRef, columns: &[Column]) -> String {
  let cols = columns
    .iter()
    .map(|c| format!("\"{}\" {}", c.name, sql_type(c.ty)))
    .collect::<Vec<_>>()
    .join(", ");
  format!("CREATE TABLE IF NOT EXISTS {} ({cols})", qualified(table))
}

pub fn drop_table(table: TableRef) -> String {
  format!("DROP TABLE IF EXISTS {}", qualified(table))
}

pub fn insert(table: TableRef, columns: &[Column]) -> String {
  let names = columns
    .iter()
    .map(|c| format!("\"{}\"", c.name))
    .collect::<Vec<_>>()
    .join(", ");
  let params = (1..=columns.len())
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ");
  format!("INSERT INTO {} ({names}) VALUES ({params})", qualified(table))
}

/// Rows come back in insertion order so "first occurrence wins" rules are
/// deterministic.
pub fn select_all(table: TableRef, columns: &[Column]) -> String {
  let names = columns
    .iter()
    .map(|c| format!("\"{}\"", c.name))
    .collect::<Vec<_>>()
    .join(", ");
  format!("SELECT {names} FROM {} ORDER BY rowid", qualified(table))
}

/// Existence probe against the layer's own catalog; the table name is bound
/// as `?1`.
pub fn table_exists(layer: Layer) -> String {
  format!("SELECT 1 FROM \"{layer}\".sqlite_master WHERE type = 'table' AND name = ?1")
}

#[cfg(test)]
mod tests {
  use datapulse_core::ColumnType;

  use super::*;

  const T: TableRef = TableRef::new(Layer::Bronze, "books_raw");
  const COLS: &[Column] = &[
    Column::new("title", ColumnType::Text),
    Column::new("price", ColumnType::Real),
  ];

  #[test]
  fn ddl_is_schema_qualified() {
    assert_eq!(
      create_table(T, COLS),
      "CREATE TABLE IF NOT EXISTS \"bronze\".\"books_raw\" (\"title\" TEXT, \"price\" REAL)"
    );
    assert_eq!(drop_table(T), "DROP TABLE IF EXISTS \"bronze\".\"books_raw\"");
  }

  #[test]
  fn insert_binds_every_column() {
    assert_eq!(
      insert(T, COLS),
      "INSERT INTO \"bronze\".\"books_raw\" (\"title\", \"price\") VALUES (?1, ?2)"
    );
  }
}
